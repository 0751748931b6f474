//! Integration tests for shared address and data-width types.

use sdram_controller::common::constants::{PAGE_ADDRESS_MASK, PAGE_WORDS};
use sdram_controller::common::error::ConfigError;
use sdram_controller::common::{DataWidth, PageAddress};

/// Tests that the column occupies the low bits, then bank, then row.
#[test]
fn test_page_address_layout() {
    let addr = PageAddress::new(0x101);
    assert_eq!(addr.column(), 0x01);
    assert_eq!(addr.bank(), 1);
    assert_eq!(addr.row(), 0);

    let addr = PageAddress::new((0x7FF << 10) | (3 << 8) | 0xFF);
    assert_eq!(addr.column(), 0xFF);
    assert_eq!(addr.bank(), 3);
    assert_eq!(addr.row(), 0x7FF);
}

/// Tests that bits above the 21-bit page address are discarded.
#[test]
fn test_page_address_truncates() {
    let addr = PageAddress::new(0xFFFF_FFFF);
    assert_eq!(addr.val(), PAGE_ADDRESS_MASK);
    assert_eq!(PAGE_ADDRESS_MASK, 0x1F_FFFF);
}

/// Tests building an address from its fields.
#[test]
fn test_page_address_from_parts() {
    let addr = PageAddress::from_parts(2, 0x123, 0x45);
    assert_eq!(addr.bank(), 2);
    assert_eq!(addr.row(), 0x123);
    assert_eq!(addr.column(), 0x45);
    assert_eq!(addr.val(), (0x123 << 10) | (2 << 8) | 0x45);
}

/// Tests that consecutive pages interleave across banks.
#[test]
fn test_consecutive_pages_change_bank() {
    let first = PageAddress::new(0);
    let second = first.offset(PAGE_WORDS);
    assert_eq!(first.bank(), 0);
    assert_eq!(second.bank(), 1);
    assert_eq!(second.row(), first.row());
}

/// Tests the pin values driven with ACTIVE and READ/WRITE.
#[test]
fn test_pin_values() {
    let addr = PageAddress::from_parts(1, 0x7FF, 0xAB);
    assert_eq!(addr.row_pins(), 0x7FF);
    assert_eq!(addr.column_pins(), 0xAB);
    assert_eq!(addr.column_pins() & (1 << 10), 0);
}

/// Tests byte-lane masks of the supported widths.
#[test]
fn test_data_width_masks() {
    let w3 = DataWidth::from_bytes(3).unwrap();
    assert_eq!(w3.dqm(), 0b1000);
    assert_eq!(w3.word_mask(), 0x00FF_FFFF);

    let w4 = DataWidth::from_bytes(4).unwrap();
    assert_eq!(w4.dqm(), 0);
    assert_eq!(w4.word_mask(), 0xFFFF_FFFF);
}

/// Tests that narrow and oversized widths are rejected.
#[test]
fn test_data_width_rejected() {
    assert!(matches!(
        DataWidth::from_bytes(1),
        Err(ConfigError::UnsupportedDataWidth(1))
    ));
    assert!(matches!(
        DataWidth::from_bytes(2),
        Err(ConfigError::UnsupportedDataWidth(2))
    ));
    assert!(matches!(
        DataWidth::from_bytes(5),
        Err(ConfigError::InvalidDataWidth(5))
    ));
}
