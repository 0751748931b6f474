//! Memory devices.
//!
//! The SDRAM device model sits at the far end of the controller pins and
//! checks the command stream while it stores and returns data.

/// Per-bank storage and row timing stamps.
pub mod bank;

/// Behavioural SDR SDRAM.
pub mod sdram;

pub use sdram::Sdram;
