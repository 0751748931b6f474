//! Canned Simulation Scenarios.
//!
//! Each scenario brings the system out of reset, runs one requester
//! pattern for a fixed number of cycles and checks the data that came back
//! or landed in the device.
//!
//! * `Refresh`: no traffic, only the periodic refresh.
//! * `Read` / `Write`: one page burst at [`SCENARIO_ADDRESS`].
//! * `ReadRefresh` / `WriteRefresh`: the same burst, started so close to the
//!   refresh deadline that the controller has to refresh first.
//! * `RoundTrip`: write a page at address 0 and read it back.

use serde::Serialize;
use tracing::info;

use crate::common::error::SimError;
use crate::common::PageAddress;
use crate::sim::requester::{Completion, Job, PageRequester};
use crate::soc::builder::Top;

/// Page address used by the single-burst scenarios (bank 1, row 0, column 1).
pub const SCENARIO_ADDRESS: u32 = 0x101;

/// Cycles a scenario runs after `ready` rises.
pub const DEFAULT_SCENARIO_CYCLES: u64 = 800;

/// Delay between `ready` and the start pulse in the plain burst scenarios.
const START_DELAY: u64 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum ScenarioKind {
    Refresh,
    Read,
    Write,
    ReadRefresh,
    WriteRefresh,
    RoundTrip,
}

/// A word that did not match what the scenario expected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub address: u32,
    pub expected: u32,
    pub actual: u32,
}

#[derive(Clone, Debug)]
pub struct ScenarioReport {
    pub kind: ScenarioKind,
    /// First cycle with `ready` high.
    pub ready_at: u64,
    /// Cycle on the wires when the scenario stopped.
    pub end_cycle: u64,
    pub completions: Vec<Completion>,
    pub mismatches: Vec<Mismatch>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Contents the read scenarios preload into the addressed row.
pub fn preload_word(column: u16) -> u32 {
    match column {
        0 => 0xAABB_CCDD,
        1 => 0xBEEF_FEEB,
        2 => 0xCAAA_BBBC,
        254 => 0xFEEF_DAAD,
        255 => 0xAFBF_CFDF,
        c => c as u32,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub cycles: u64,
}

impl Scenario {
    pub fn new(kind: ScenarioKind, cycles: u64) -> Self {
        Self { kind, cycles }
    }

    /// Runs the scenario on a system fresh out of reset.
    ///
    /// # Arguments
    ///
    /// * `top` - System to clock; its device receives the preloaded data
    ///
    /// # Returns
    ///
    /// The report with completions and data mismatches, or the first
    /// simulation error.
    pub fn run(&self, top: &mut Top) -> Result<ScenarioReport, SimError> {
        let timing = *top.controller().timing();
        let mask = top.controller().data_width().word_mask();
        let burst_length = top.controller().mode().burst_length;

        let ready_at = top.run_until_ready(timing.init_cycles() + 16)?;
        info!(kind = ?self.kind, ready_at, "scenario start");

        let target = PageAddress::new(match self.kind {
            ScenarioKind::RoundTrip => 0,
            _ => SCENARIO_ADDRESS,
        });
        let beats = burst_length.beats_from(target.column());
        let start = match self.kind {
            ScenarioKind::ReadRefresh | ScenarioKind::WriteRefresh => {
                ready_at + timing.refi as u64 - timing.burst_bound(beats) as u64 / 2
            }
            _ => ready_at + START_DELAY,
        };
        let words: Vec<u32> = (0..beats)
            .map(|i| (0x00A5_0000 | target.offset(i).column() as u32) & mask)
            .collect();

        let mut requester = PageRequester::new();
        let mut expected = Vec::new();
        match self.kind {
            ScenarioKind::Refresh => {}
            ScenarioKind::Read | ScenarioKind::ReadRefresh => {
                for i in 0..beats {
                    let addr = target.offset(i);
                    let value = preload_word(addr.column());
                    top.device_mut().poke(addr.bank(), addr.row(), addr.column(), value);
                    expected.push((addr, value & mask));
                }
                requester.push_at(
                    Job::Read {
                        address: target,
                        words: beats as usize,
                    },
                    start,
                );
            }
            ScenarioKind::Write | ScenarioKind::WriteRefresh => {
                requester.push_at(
                    Job::Write {
                        address: target,
                        words: words.clone(),
                    },
                    start,
                );
            }
            ScenarioKind::RoundTrip => {
                requester.push_at(
                    Job::Write {
                        address: target,
                        words: words.clone(),
                    },
                    start,
                );
                requester.push(Job::Read {
                    address: target,
                    words: beats as usize,
                });
                expected = (0..beats)
                    .map(|i| target.offset(i))
                    .zip(words.iter().copied())
                    .collect();
            }
        }

        crate::sim::run(top, &mut requester, self.cycles)?;
        if !requester.is_idle() {
            crate::sim::run_until_idle(top, &mut requester, timing.refi as u64 * 2)?;
        }
        top.finish()?;

        let completions = requester.take_completions();
        let mut mismatches = Vec::new();
        match self.kind {
            ScenarioKind::Refresh => {}
            ScenarioKind::Read | ScenarioKind::ReadRefresh | ScenarioKind::RoundTrip => {
                let data = completions
                    .iter()
                    .rev()
                    .find_map(|c| match c {
                        Completion::Read { data, .. } => Some(data.as_slice()),
                        _ => None,
                    })
                    .unwrap_or(&[]);
                for (i, (addr, want)) in expected.iter().enumerate() {
                    let got = data.get(i).copied().unwrap_or(!want);
                    if got != *want {
                        mismatches.push(Mismatch {
                            address: addr.val(),
                            expected: *want,
                            actual: got,
                        });
                    }
                }
            }
            ScenarioKind::Write | ScenarioKind::WriteRefresh => {
                for (i, want) in words.iter().enumerate() {
                    let addr = target.offset(i as u32);
                    let got = top.device().peek(addr.bank(), addr.row(), addr.column()) & mask;
                    if got != *want {
                        mismatches.push(Mismatch {
                            address: addr.val(),
                            expected: *want,
                            actual: got,
                        });
                    }
                }
            }
        }

        Ok(ScenarioReport {
            kind: self.kind,
            ready_at,
            end_cycle: top.cycle(),
            completions,
            mismatches,
        })
    }
}
