//! Common types and constants shared by the controller, the device model
//! and the simulation harness.
//!
//! This module provides the page address layout, data-width handling,
//! device geometry constants and the error types used across the crate.

/// Page address layout (column, bank, row).
pub mod addr;

/// Device geometry and bus constants.
pub mod constants;

/// Burst direction and data-width definitions.
pub mod data;

/// Configuration, device and simulation error types.
pub mod error;

pub use addr::PageAddress;
pub use data::{BurstKind, DataWidth};
pub use error::{ConfigError, DeviceError, SimError};

pub use constants::{BANK_COUNT, PAGE_WORDS};
