//! Refresh Scheduler.
//!
//! Counts edges since the last AUTO-REFRESH was scheduled. The controller asks
//! it two questions in IDLE: is a refresh due now, and would a burst of a
//! given length still finish before the deadline.

use crate::common::constants::REFRESH_MARGIN;

#[derive(Clone, Debug)]
pub struct RefreshScheduler {
    interval: u32,
    elapsed: u32,
    armed: bool,
}

impl RefreshScheduler {
    /// Creates a scheduler for a refresh every `interval` cycles.
    ///
    /// The counter starts disarmed; the first refresh of the init sequence
    /// arms it.
    pub fn new(interval: u32) -> Self {
        Self {
            interval,
            elapsed: 0,
            armed: false,
        }
    }

    /// Advances the counter by one edge.
    pub fn tick(&mut self) {
        if self.armed {
            self.elapsed = self.elapsed.saturating_add(1);
        }
    }

    /// Records an AUTO-REFRESH scheduled at this edge.
    pub fn issued(&mut self) {
        self.elapsed = 0;
        self.armed = true;
    }

    /// True when a refresh must be scheduled at this edge.
    pub fn due(&self) -> bool {
        self.armed && self.elapsed + REFRESH_MARGIN >= self.interval
    }

    /// True when an operation of at most `cycles` cycles started now ends
    /// with enough room left to schedule the refresh in time.
    pub fn fits(&self, cycles: u32) -> bool {
        !self.armed
            || self
                .elapsed
                .saturating_add(cycles)
                .saturating_add(REFRESH_MARGIN)
                < self.interval
    }

    /// Edges since the last refresh was scheduled.
    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }
}
