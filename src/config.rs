//! Simulator Configuration.
//!
//! `Config` is read from TOML and fixed when the controller is built; there
//! are no run-time setters. Every field has a datasheet default so a partial
//! file (or none at all) yields a working 120 MHz, CL3 setup.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::error::ConfigError;
use crate::common::DataWidth;
use crate::core::mode::BurstLength;
use crate::core::timing::Timing;

const DEFAULT_FREQUENCY_HZ: u64 = 120_000_000;
const DEFAULT_CAS_LATENCY: u8 = 3;
const DEFAULT_INIT_REFRESH_COUNT: u8 = 2;
const DEFAULT_DATA_BYTE_WIDTH: u8 = 3;

const T_POWER_UP_NS: f64 = 200_000.0;
const T_RC_NS: f64 = 55.0;
const T_RCD_NS: f64 = 42.0;
const T_RP_NS: f64 = 15.0;
const T_RRD_NS: f64 = 10.0;
const T_RAS_NS: f64 = 40.0;
const T_WR_NS: f64 = 15.0;
const T_MRD_NS: f64 = 30.0;
const T_REFI_NS: f64 = 7_800.0;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub interface: InterfaceConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Emit a `trace` event for every command put on the pins.
    #[serde(default)]
    pub trace_commands: bool,
    /// Keep a per-cycle `CycleRecord` history in the top level.
    #[serde(default)]
    pub record_history: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClockConfig {
    #[serde(default = "default_frequency")]
    pub frequency_hz: u64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            frequency_hz: default_frequency(),
        }
    }
}

/// Datasheet timings in nanoseconds plus the cycle-based mode settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimingConfig {
    #[serde(default = "default_t_power_up")]
    pub t_power_up_ns: f64,

    #[serde(default = "default_t_rc")]
    pub t_rc_ns: f64,

    #[serde(default = "default_t_rcd")]
    pub t_rcd_ns: f64,

    #[serde(default = "default_t_rp")]
    pub t_rp_ns: f64,

    #[serde(default = "default_t_rrd")]
    pub t_rrd_ns: f64,

    #[serde(default = "default_t_ras")]
    pub t_ras_ns: f64,

    #[serde(default = "default_t_wr")]
    pub t_wr_ns: f64,

    #[serde(default = "default_t_mrd")]
    pub t_mrd_ns: f64,

    #[serde(default = "default_t_refi")]
    pub t_refi_ns: f64,

    #[serde(default = "default_cas_latency")]
    pub cas_latency: u8,

    #[serde(default = "default_init_refresh_count")]
    pub init_refresh_count: u8,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            t_power_up_ns: default_t_power_up(),
            t_rc_ns: default_t_rc(),
            t_rcd_ns: default_t_rcd(),
            t_rp_ns: default_t_rp(),
            t_rrd_ns: default_t_rrd(),
            t_ras_ns: default_t_ras(),
            t_wr_ns: default_t_wr(),
            t_mrd_ns: default_t_mrd(),
            t_refi_ns: default_t_refi(),
            cas_latency: default_cas_latency(),
            init_refresh_count: default_init_refresh_count(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InterfaceConfig {
    #[serde(default = "default_data_byte_width")]
    pub data_byte_width: u8,

    #[serde(default)]
    pub burst_length: BurstLength,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            data_byte_width: default_data_byte_width(),
            burst_length: BurstLength::default(),
        }
    }
}

impl InterfaceConfig {
    /// Validated byte-lane width.
    pub fn data_width(&self) -> Result<DataWidth, ConfigError> {
        DataWidth::from_bytes(self.data_byte_width)
    }
}

impl Config {
    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks that the configuration describes a working controller.
    ///
    /// Converts the timings to cycles, which also enforces the refresh
    /// window, and checks the byte-lane width.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interface.data_width()?;
        self.cycle_timing()?;
        Ok(())
    }

    /// Timing parameters converted to clock cycles.
    pub fn cycle_timing(&self) -> Result<Timing, ConfigError> {
        Timing::from_config(&self.timing, self.clock.frequency_hz, self.interface.burst_length)
    }
}

fn default_frequency() -> u64 {
    DEFAULT_FREQUENCY_HZ
}

fn default_t_power_up() -> f64 {
    T_POWER_UP_NS
}

fn default_t_rc() -> f64 {
    T_RC_NS
}

fn default_t_rcd() -> f64 {
    T_RCD_NS
}

fn default_t_rp() -> f64 {
    T_RP_NS
}

fn default_t_rrd() -> f64 {
    T_RRD_NS
}

fn default_t_ras() -> f64 {
    T_RAS_NS
}

fn default_t_wr() -> f64 {
    T_WR_NS
}

fn default_t_mrd() -> f64 {
    T_MRD_NS
}

fn default_t_refi() -> f64 {
    T_REFI_NS
}

fn default_cas_latency() -> u8 {
    DEFAULT_CAS_LATENCY
}

fn default_init_refresh_count() -> u8 {
    DEFAULT_INIT_REFRESH_COUNT
}

fn default_data_byte_width() -> u8 {
    DEFAULT_DATA_BYTE_WIDTH
}
