//! SDRAM Controller Model Library.
//!
//! This crate implements a cycle-accurate model of an SDR SDRAM controller
//! for FPGA designs. A page-oriented read/write request interface is turned
//! into JEDEC command sequences, and a single bidirectional data bus is
//! multiplexed between the host-write and device-read directions.
//!
//! # Architecture
//!
//! * **Sequencer**: init sequence, refresh scheduling, bank activation and
//!   page bursts, one state transition per clock edge.
//! * **Bus mux**: resolves the data line from the sequencer's write enable.
//! * **Device**: a behavioural SDRAM that checks every timing constraint.
//!
//! # Modules
//!
//! * `common`: Shared types, constants, and error handling.
//! * `config`: Configuration loading and parsing.
//! * `core`: Controller state machine and its building blocks.
//! * `sim`: Requester model, scenarios and waveform output.
//! * `soc`: Bus mux, memory device and top-level wiring.
//! * `stats`: Simulation statistics collection.

/// Shared types, constants and error definitions.
///
/// Provides the page address layout, data-width handling and the error
/// types used throughout the crate.
pub mod common;

/// Configuration system for clock, timing and interface settings.
///
/// Loads and parses TOML configuration files; the values are fixed when a
/// controller is built.
pub mod config;

/// Controller core: sequencer, init, refresh, banks, commands and timing.
pub mod core;

/// Simulation harness: requester model, canned scenarios and VCD output.
pub mod sim;

/// Bus direction mux, SDRAM device model and top-level integration.
pub mod soc;

/// Simulation statistics collection and reporting.
///
/// Tracks command counts, data traffic, refresh spacing and bus ownership.
pub mod stats;
