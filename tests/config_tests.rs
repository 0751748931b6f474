//! Integration tests for configuration parsing and timing conversion.

use sdram_controller::common::error::ConfigError;
use sdram_controller::config::Config;
use sdram_controller::core::mode::BurstLength;
use sdram_controller::core::timing::ns_to_cycles;

/// Tests that the defaults convert to the datasheet cycle counts at 120 MHz.
#[test]
fn test_default_cycle_timing() {
    let config = Config::default();
    let t = config.cycle_timing().unwrap();

    assert_eq!(t.power_up, 24_000);
    assert_eq!(t.rc, 7);
    assert_eq!(t.rcd, 6);
    assert_eq!(t.rp, 2);
    assert_eq!(t.rrd, 2);
    assert_eq!(t.ras, 5);
    assert_eq!(t.wr, 2);
    assert_eq!(t.mrd, 4);
    assert_eq!(t.refi, 936);
    assert_eq!(t.cas_latency, 3);
    assert_eq!(t.init_refreshes, 2);
    assert_eq!(t.max_burst_words, 8);
}

/// Tests rounding up of nanosecond timings.
#[test]
fn test_ns_to_cycles_rounds_up() {
    assert_eq!(ns_to_cycles(42.0, 120_000_000), Some(6));
    assert_eq!(ns_to_cycles(15.0, 120_000_000), Some(2));
    assert_eq!(ns_to_cycles(10.0, 100_000_000), Some(1));
    assert_eq!(ns_to_cycles(10.1, 100_000_000), Some(2));
    assert_eq!(ns_to_cycles(0.0, 100_000_000), Some(0));
}

/// Tests that intervals too long for a cycle counter are not clamped.
#[test]
fn test_ns_to_cycles_out_of_range() {
    assert_eq!(ns_to_cycles(1e30, 120_000_000), None);
    assert_eq!(ns_to_cycles(f64::INFINITY, 120_000_000), None);
    assert_eq!(ns_to_cycles(f64::NAN, 120_000_000), None);
}

/// Tests that huge timings come back as errors instead of overflowing.
#[test]
fn test_huge_timing_rejected() {
    let err = Config::from_toml_str("[timing]\nt_rc_ns = 1e30\n").unwrap_err();
    assert!(matches!(err, ConfigError::TimingOutOfRange("t_rc")));

    let err = Config::from_toml_str("[timing]\nt_refi_ns = 1e30\n").unwrap_err();
    assert!(matches!(err, ConfigError::TimingOutOfRange("t_refi")));

    // Every parameter fits in u32 but their sum does not.
    let err = Config::from_toml_str(
        r#"
        [clock]
        frequency_hz = 100000000

        [timing]
        t_rc_ns = 20000000000.0
        t_ras_ns = 20000000000.0
        t_refi_ns = 30000000000.0
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::RefreshWindow { .. }));
}

/// Tests the init duration formula.
#[test]
fn test_init_cycles() {
    let t = Config::default().cycle_timing().unwrap();
    assert_eq!(t.init_cycles(), 24_000 + 1 + 2 + 2 * 7 + 4);
}

/// Tests that a partial TOML file keeps defaults for missing fields.
#[test]
fn test_partial_toml() {
    let config = Config::from_toml_str(
        r#"
        [clock]
        frequency_hz = 100000000

        [interface]
        data_byte_width = 4
        burst_length = "full-page"
        "#,
    )
    .unwrap();

    assert_eq!(config.clock.frequency_hz, 100_000_000);
    assert_eq!(config.interface.data_byte_width, 4);
    assert_eq!(config.interface.burst_length, BurstLength::FullPage);
    assert_eq!(config.timing.cas_latency, 3);
    assert_eq!(config.cycle_timing().unwrap().max_burst_words, 256);
}

/// Tests that an empty document is the default configuration.
#[test]
fn test_empty_toml() {
    let config = Config::from_toml_str("").unwrap();
    assert_eq!(config.clock.frequency_hz, 120_000_000);
    assert_eq!(config.interface.burst_length, BurstLength::Eight);
    assert!(!config.general.trace_commands);
}

/// Tests loading the configuration shipped with the crate.
#[test]
fn test_shipped_config() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/default.toml");
    let config = Config::load(path).unwrap();
    let t = config.cycle_timing().unwrap();
    assert_eq!(t.refi, 936);
    assert_eq!(config.interface.data_byte_width, 3);
}

/// Tests that one and two byte interfaces are refused.
#[test]
fn test_narrow_width_rejected() {
    let err = Config::from_toml_str("[interface]\ndata_byte_width = 2\n").unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedDataWidth(2)));

    let err = Config::from_toml_str("[interface]\ndata_byte_width = 1\n").unwrap_err();
    assert!(matches!(err, ConfigError::UnsupportedDataWidth(1)));
}

/// Tests CAS latency and init refresh validation.
#[test]
fn test_timing_validation() {
    let err = Config::from_toml_str("[timing]\ncas_latency = 4\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidCasLatency(4)));

    let err = Config::from_toml_str("[timing]\ninit_refresh_count = 1\n").unwrap_err();
    assert!(matches!(err, ConfigError::InitRefreshCount(1)));

    let err = Config::from_toml_str("[timing]\nt_rp_ns = 0.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ZeroTiming("t_rp")));

    let err = Config::from_toml_str("[clock]\nfrequency_hz = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ZeroClock));
}

/// Tests that a refresh interval shorter than a full-page burst is refused.
#[test]
fn test_refresh_window_too_short() {
    let err = Config::from_toml_str(
        r#"
        [timing]
        t_refi_ns = 2000.0

        [interface]
        burst_length = "full-page"
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::RefreshWindow { .. }));

    // Short bursts still fit the same interval.
    assert!(Config::from_toml_str("[timing]\nt_refi_ns = 2000.0\n").is_ok());
}

/// Tests that malformed TOML surfaces as a parse error.
#[test]
fn test_parse_error() {
    let err = Config::from_toml_str("[clock\nfrequency_hz = 1").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
