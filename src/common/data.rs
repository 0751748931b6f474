//! Burst Direction and Data Width.
//!
//! These types describe what a requester asked for and how many byte lanes
//! of the 32-bit device bus carry meaningful data.

use serde::Serialize;

use super::error::ConfigError;

/// Direction of a page burst.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BurstKind {
    /// Device to requester.
    Read,

    /// Requester to device.
    Write,
}

/// Number of byte lanes of the device bus used by the requester.
///
/// Only the full 32-bit bus and the 24-bit (three lane) interface are
/// supported. Narrower interfaces are rejected at configuration time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DataWidth {
    /// Three byte lanes, the MSB lane is masked.
    Bytes3,

    /// All four byte lanes.
    Bytes4,
}

impl DataWidth {
    /// Converts a byte count from the configuration.
    ///
    /// # Returns
    ///
    /// `ConfigError::UnsupportedDataWidth` for 1 and 2 byte interfaces and
    /// `ConfigError::InvalidDataWidth` for anything outside 1..=4.
    pub fn from_bytes(bytes: u8) -> Result<Self, ConfigError> {
        match bytes {
            3 => Ok(DataWidth::Bytes3),
            4 => Ok(DataWidth::Bytes4),
            1 | 2 => Err(ConfigError::UnsupportedDataWidth(bytes)),
            other => Err(ConfigError::InvalidDataWidth(other)),
        }
    }

    /// Byte count of this width.
    pub fn bytes(&self) -> u8 {
        match self {
            DataWidth::Bytes3 => 3,
            DataWidth::Bytes4 => 4,
        }
    }

    /// DQM value driven while transferring data.
    pub fn dqm(&self) -> u8 {
        match self {
            DataWidth::Bytes3 => 0b1000,
            DataWidth::Bytes4 => 0b0000,
        }
    }

    /// Mask applied to words crossing the requester interface.
    pub fn word_mask(&self) -> u32 {
        match self {
            DataWidth::Bytes3 => 0x00FF_FFFF,
            DataWidth::Bytes4 => 0xFFFF_FFFF,
        }
    }
}
