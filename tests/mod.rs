//! Test module organization.
//!
//! This module organizes all integration tests for the SDRAM controller model.



/// Page address and data-width tests.
mod common_tests;

/// Configuration loading, validation and cycle conversion tests.
mod config_tests;


/// SDRAM device model protocol and timing tests.
mod device_tests;

/// Power-up initialization sequence tests.
mod init_tests;



/// Property-based tests over arbitrary addresses and data.
mod property_tests;

/// Refresh scheduler tests.
mod refresh_tests;
