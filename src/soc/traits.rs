//! System-on-Chip Traits.
//!
//! The top level talks to the memory at the far end of the bus only through
//! `MemoryDevice`, so a different device model (or a recording stub in a
//! test) can replace the SDRAM model.

use crate::common::error::{DeviceError, SimError};
use crate::core::signals::DevicePins;
use crate::soc::mux::LineState;

/// A clocked memory device attached to the controller pins and the data line.
pub trait MemoryDevice {
    /// Returns the user-friendly name of the device.
    ///
    /// Used for logging and the statistics banner.
    fn name(&self) -> &str;

    /// Value the device drives onto the data line during the current cycle.
    ///
    /// `None` while its output drivers are off.
    fn output(&self) -> Option<u32>;

    /// Samples pins and data line at the rising edge closing the current cycle.
    ///
    /// # Returns
    ///
    /// A `DeviceError` when the command stream breaks the protocol or a
    /// timing constraint.
    fn clk(&mut self, pins: &DevicePins, line: LineState) -> Result<(), DeviceError>;

    /// Reads a stored word without bus timing. Used by tests and scenarios.
    fn peek(&self, bank: u8, row: u16, column: u16) -> u32;

    /// Stores a word without bus timing.
    fn poke(&mut self, bank: u8, row: u16, column: u16, value: u32);
}

/// Receives one `CycleRecord` per simulated cycle.
///
/// Waveform writers and other probes implement this and are attached to the
/// top level.
pub trait CycleObserver {
    /// Called once per cycle, before the clock edge that closes it.
    fn record(&mut self, record: &crate::soc::builder::CycleRecord) -> Result<(), SimError>;

    /// Called when the simulation ends. Default does nothing.
    fn finish(&mut self) -> Result<(), SimError> {
        Ok(())
    }
}
