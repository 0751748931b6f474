//! Error Types.
//!
//! Three families of failures exist in the model:
//! 1. `ConfigError`: the configuration cannot describe a working controller.
//! 2. `DeviceError`: the memory device observed a protocol or timing violation.
//! 3. `SimError`: the top level detected a fault while wiring the parts together.
//!
//! The controller itself never fails at run time; violations surface through
//! the device model and the bus mux.

use thiserror::Error;

use crate::core::command::Command;

/// Rejected configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Data widths of one and two bytes are a known, unfixed defect of the
    /// byte-lane masking and are refused.
    #[error("data width of {0} byte(s) is not supported (only 3 or 4 byte interfaces work)")]
    UnsupportedDataWidth(u8),

    /// Data width outside the physical bus.
    #[error("data width of {0} bytes does not fit the 32-bit device bus")]
    InvalidDataWidth(u8),

    /// CAS latency the mode register cannot express.
    #[error("CAS latency {0} is not supported (expected 2 or 3)")]
    InvalidCasLatency(u8),

    /// Fewer than the two refresh cycles the device requires during init.
    #[error("initialization needs at least 2 refresh cycles, got {0}")]
    InitRefreshCount(u8),

    /// Zero clock frequency.
    #[error("clock frequency must be non-zero")]
    ZeroClock,

    /// A timing parameter converted to zero cycles.
    #[error("timing parameter {0} must be at least one cycle")]
    ZeroTiming(&'static str),

    /// A timing parameter too long to count in cycles.
    #[error("timing parameter {0} is out of range for the clock")]
    TimingOutOfRange(&'static str),

    /// Refresh interval too short to fit the longest burst plus a refresh.
    #[error("refresh interval too short: {required} cycles needed, {available} available")]
    RefreshWindow { required: u64, available: u32 },

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML for `Config`.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Protocol and timing violations detected by the SDRAM device model.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeviceError {
    /// A command other than NOP/DESELECT arrived before the power-up delay.
    #[error("cycle {cycle}: {command} issued {elapsed} cycles after power-up (needs {required})")]
    PowerUp {
        cycle: u64,
        command: Command,
        elapsed: u64,
        required: u64,
    },

    /// Array access before the mode register and init refreshes.
    #[error("cycle {cycle}: {command} before initialization completed")]
    NotInitialized { cycle: u64, command: Command },

    /// ACTIVE on a bank that already has an open row.
    #[error("cycle {cycle}: ACTIVE on bank {bank} which already has row {row:#05x} open")]
    BankAlreadyActive { cycle: u64, bank: u8, row: u16 },

    /// READ/WRITE on a bank with no open row.
    #[error("cycle {cycle}: {command} on idle bank {bank}")]
    BankNotActive {
        cycle: u64,
        bank: u8,
        command: Command,
    },

    /// A minimum delay between two commands was not respected.
    #[error("cycle {cycle}: {parameter} violated on bank {bank} ({elapsed} < {required} cycles)")]
    Timing {
        cycle: u64,
        parameter: &'static str,
        bank: u8,
        elapsed: u64,
        required: u64,
    },

    /// REFRESH or LOAD MODE with a row still open.
    #[error("cycle {cycle}: {command} while bank {bank} is active")]
    BankOpen {
        cycle: u64,
        bank: u8,
        command: Command,
    },

    /// The refresh interval elapsed without an AUTO-REFRESH.
    #[error("cycle {cycle}: {elapsed} cycles since the last refresh (limit {limit})")]
    RefreshOverdue { cycle: u64, elapsed: u64, limit: u64 },

    /// A write beat found the data line floating on an unmasked lane.
    #[error("cycle {cycle}: write beat to column {column:#04x} with an undriven bus")]
    UndrivenWrite { cycle: u64, column: u16 },

    /// LOAD MODE REGISTER with a value the device does not implement.
    #[error("cycle {cycle}: unsupported mode register value {value:#05x}")]
    InvalidMode { cycle: u64, value: u16 },

    /// READ/WRITE with A10 set; auto-precharge is not modelled.
    #[error("cycle {cycle}: {command} with auto-precharge is not supported")]
    AutoPrecharge { cycle: u64, command: Command },
}

/// Faults reported by the top-level simulation.
#[derive(Debug, Error)]
pub enum SimError {
    /// The device model rejected the command stream.
    #[error("device: {0}")]
    Device(#[from] DeviceError),

    /// Controller and device drove the data line in the same cycle.
    #[error("cycle {cycle}: bus contention (controller and device both drive DQ)")]
    BusContention { cycle: u64 },

    /// A bounded run finished before the awaited condition.
    #[error("timed out after {cycles} cycles waiting for {waiting_for}")]
    Timeout {
        cycles: u64,
        waiting_for: &'static str,
    },

    /// Waveform output failed.
    #[error("trace output: {0}")]
    Io(#[from] std::io::Error),
}
