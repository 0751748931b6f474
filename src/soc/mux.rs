//! Bus Direction Mux.
//!
//! The only place where the bidirectional DQ line is resolved. The controller
//! picks the direction with `dq_write_enable`; the device drives the line
//! only while it has read data to return. A line nobody drives floats high.

use serde::Serialize;

use crate::common::constants::FLOATING_BUS;

/// Level of the data line during one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineState {
    Driven(u32),
    HighZ,
}

impl LineState {
    /// Value a receiver samples; a floating line reads as all ones.
    pub fn value(&self) -> u32 {
        match self {
            LineState::Driven(v) => *v,
            LineState::HighZ => FLOATING_BUS,
        }
    }

    pub fn is_driven(&self) -> bool {
        matches!(self, LineState::Driven(_))
    }
}

/// Who owns the data line in a cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BusDriver {
    Nobody,
    Controller,
    Device,
}

#[derive(Clone, Debug)]
pub struct BusDirectionMux {
    line: LineState,
    driver: BusDriver,
    contention: bool,
}

impl Default for BusDirectionMux {
    fn default() -> Self {
        Self::new()
    }
}

impl BusDirectionMux {
    pub fn new() -> Self {
        Self {
            line: LineState::HighZ,
            driver: BusDriver::Nobody,
            contention: false,
        }
    }

    /// Resolves the line for the current cycle.
    ///
    /// # Arguments
    ///
    /// * `write_enable` - Direction pin from the sequencer
    /// * `host_data` - Word the sequencer offers for writing
    /// * `device_output` - Word the device drives, if any
    ///
    /// # Returns
    ///
    /// The line state. With `write_enable` high the host value wins; if the
    /// device drives at the same time the cycle is flagged as contention.
    pub fn resolve(
        &mut self,
        write_enable: bool,
        host_data: u32,
        device_output: Option<u32>,
    ) -> LineState {
        self.contention = write_enable && device_output.is_some();
        (self.line, self.driver) = match (write_enable, device_output) {
            (true, _) => (LineState::Driven(host_data), BusDriver::Controller),
            (false, Some(v)) => (LineState::Driven(v), BusDriver::Device),
            (false, None) => (LineState::HighZ, BusDriver::Nobody),
        };
        self.line
    }

    /// Line state of the last resolved cycle.
    pub fn line(&self) -> LineState {
        self.line
    }

    /// Value presented to the controller's read path.
    pub fn read_data(&self) -> u32 {
        self.line.value()
    }

    pub fn driver(&self) -> BusDriver {
        self.driver
    }

    /// True when both sides tried to drive in the last resolved cycle.
    pub fn contention(&self) -> bool {
        self.contention
    }
}
