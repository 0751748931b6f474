//! Simulation harness.
//!
//! A requester model, canned scenarios and waveform output built around
//! the top-level `Top`.

/// Requester-side job queue and handshake.
pub mod requester;

/// Canned end-to-end scenarios.
pub mod scenario;

/// VCD waveform writer.
pub mod trace;

pub use requester::{Completion, Job, PageRequester};
pub use scenario::{Scenario, ScenarioKind, ScenarioReport};
pub use trace::VcdTrace;

use crate::common::error::SimError;
use crate::soc::builder::Top;

/// Clocks `top` for `cycles` edges with `requester` on the request interface.
pub fn run(top: &mut Top, requester: &mut PageRequester, cycles: u64) -> Result<(), SimError> {
    for _ in 0..cycles {
        step(top, requester)?;
    }
    Ok(())
}

/// Clocks `top` until every queued job has completed and the controller is
/// ready again.
///
/// # Returns
///
/// The cycle at which the system went idle.
pub fn run_until_idle(
    top: &mut Top,
    requester: &mut PageRequester,
    limit: u64,
) -> Result<u64, SimError> {
    let start = top.cycle();
    while !(requester.is_idle() && top.controller().is_ready()) {
        if top.cycle() - start >= limit {
            return Err(SimError::Timeout {
                cycles: limit,
                waiting_for: "requester jobs",
            });
        }
        step(top, requester)?;
    }
    Ok(top.cycle())
}

fn step(top: &mut Top, requester: &mut PageRequester) -> Result<(), SimError> {
    let outputs = *top.controller().outputs();
    let signals = requester.step(&outputs, top.cycle());
    top.tick(&signals)
}
