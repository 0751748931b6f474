//! Cycle Timing.
//!
//! Datasheet timings are given in nanoseconds. They are converted once, when
//! a controller or device is built, to whole clock cycles by rounding up.

use crate::common::constants::REFRESH_MARGIN;
use crate::common::error::ConfigError;
use crate::config::TimingConfig;
use crate::core::mode::BurstLength;

/// Timing parameters in clock cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Stable-clock delay after power-up before the first command.
    pub power_up: u32,
    /// ACTIVE to ACTIVE (same bank) and REFRESH to any command.
    pub rc: u32,
    /// ACTIVE to READ/WRITE.
    pub rcd: u32,
    /// PRECHARGE to ACTIVE/REFRESH.
    pub rp: u32,
    /// ACTIVE to ACTIVE (different bank).
    pub rrd: u32,
    /// ACTIVE to PRECHARGE.
    pub ras: u32,
    /// Last write beat to PRECHARGE.
    pub wr: u32,
    /// LOAD MODE to the next command.
    pub mrd: u32,
    /// Maximum spacing of AUTO-REFRESH commands.
    pub refi: u32,
    /// READ to first data beat.
    pub cas_latency: u32,
    /// AUTO-REFRESH commands issued during initialization.
    pub init_refreshes: u32,
    /// Longest burst the programmed burst length allows.
    pub max_burst_words: u32,
}

impl Timing {
    /// Converts a timing configuration to cycles and validates it.
    ///
    /// # Arguments
    ///
    /// * `cfg` - Timings in nanoseconds plus CAS latency and init refresh count
    /// * `clock_hz` - Controller clock frequency
    /// * `burst_length` - Programmed burst length, bounds the refresh window check
    ///
    /// # Returns
    ///
    /// The cycle timings, or the first parameter that cannot work.
    pub fn from_config(
        cfg: &TimingConfig,
        clock_hz: u64,
        burst_length: BurstLength,
    ) -> Result<Self, ConfigError> {
        if clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        if !(2..=3).contains(&cfg.cas_latency) {
            return Err(ConfigError::InvalidCasLatency(cfg.cas_latency));
        }
        if cfg.init_refresh_count < 2 {
            return Err(ConfigError::InitRefreshCount(cfg.init_refresh_count));
        }

        let cycles = |name: &'static str, ns: f64| -> Result<u32, ConfigError> {
            match ns_to_cycles(ns, clock_hz) {
                None => Err(ConfigError::TimingOutOfRange(name)),
                Some(0) => Err(ConfigError::ZeroTiming(name)),
                Some(n) => Ok(n),
            }
        };

        let timing = Self {
            power_up: cycles("t_power_up", cfg.t_power_up_ns)?,
            rc: cycles("t_rc", cfg.t_rc_ns)?,
            rcd: cycles("t_rcd", cfg.t_rcd_ns)?,
            rp: cycles("t_rp", cfg.t_rp_ns)?,
            rrd: cycles("t_rrd", cfg.t_rrd_ns)?,
            ras: cycles("t_ras", cfg.t_ras_ns)?,
            wr: cycles("t_wr", cfg.t_wr_ns)?,
            mrd: cycles("t_mrd", cfg.t_mrd_ns)?,
            refi: cycles("t_refi", cfg.t_refi_ns)?,
            cas_latency: cfg.cas_latency as u32,
            init_refreshes: cfg.init_refresh_count as u32,
            max_burst_words: burst_length.block_words(),
        };

        let required = timing.burst_bound_wide(timing.max_burst_words)
            + timing.rc as u64
            + REFRESH_MARGIN as u64;
        if required >= timing.refi as u64 {
            return Err(ConfigError::RefreshWindow {
                required,
                available: timing.refi,
            });
        }
        Ok(timing)
    }

    /// Upper bound, in cycles, from accepting a burst of `beats` words in IDLE
    /// until the controller is back in IDLE.
    ///
    /// Covers waiting for the bank (tRC/tRRD), tRCD, the CAS latency, the
    /// data beats, write recovery, tRAS and the closing precharge.
    pub fn burst_bound(&self, beats: u32) -> u32 {
        u32::try_from(self.burst_bound_wide(beats)).unwrap_or(u32::MAX)
    }

    fn burst_bound_wide(&self, beats: u32) -> u64 {
        [
            self.rc,
            self.rrd,
            self.rcd,
            self.cas_latency,
            beats,
            self.wr,
            self.ras,
            self.rp,
            REFRESH_MARGIN,
        ]
        .iter()
        .map(|&c| c as u64)
        .sum()
    }

    /// Index of the first cycle in which the controller reports `ready`.
    ///
    /// Power-up with DESELECT, one NOP with CKE high, PRECHARGE ALL and tRP,
    /// the init refreshes with tRC each, LOAD MODE and tMRD.
    pub fn init_cycles(&self) -> u64 {
        self.power_up as u64
            + 1
            + self.rp as u64
            + self.init_refreshes as u64 * self.rc as u64
            + self.mrd as u64
    }
}

/// Rounds a nanosecond interval up to whole cycles of `clock_hz`.
///
/// Returns `None` when the result does not fit in `u32` or `ns` is not a
/// number.
pub fn ns_to_cycles(ns: f64, clock_hz: u64) -> Option<u32> {
    if ns.is_nan() {
        return None;
    }
    if ns <= 0.0 {
        return Some(0);
    }
    let cycles = (ns * clock_hz as f64 / 1e9 - 1e-9).ceil().max(0.0);
    if cycles > u32::MAX as f64 {
        return None;
    }
    Some(cycles as u32)
}
