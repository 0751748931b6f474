//! Page Address Layout.
//!
//! A requester addresses memory with a 21-bit page address. The low bits
//! select the column, the next two the bank and the top eleven the row, so
//! consecutive pages land in different banks.

use std::fmt;

use super::constants::{
    BANK_ADDRESS_WIDTH, COLUMN_ADDRESS_WIDTH, PAGE_ADDRESS_MASK, ROW_ADDRESS_WIDTH,
};

const COLUMN_MASK: u32 = (1 << COLUMN_ADDRESS_WIDTH) - 1;
const BANK_MASK: u32 = (1 << BANK_ADDRESS_WIDTH) - 1;
const ROW_MASK: u32 = (1 << ROW_ADDRESS_WIDTH) - 1;
const BANK_SHIFT: u32 = COLUMN_ADDRESS_WIDTH;
const ROW_SHIFT: u32 = COLUMN_ADDRESS_WIDTH + BANK_ADDRESS_WIDTH;

/// A requester-side word address split into column, bank and row.
///
/// Bits above the 21-bit page address are discarded on construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageAddress(u32);

impl PageAddress {
    /// Creates a page address from a raw requester value.
    pub const fn new(raw: u32) -> Self {
        Self(raw & PAGE_ADDRESS_MASK)
    }

    /// Builds an address from its bank, row and column fields.
    ///
    /// # Arguments
    ///
    /// * `bank` - Bank index (0-3)
    /// * `row` - Row index (0-2047)
    /// * `column` - Column index within the row (0-255)
    pub fn from_parts(bank: u8, row: u16, column: u16) -> Self {
        let raw = (column as u32 & COLUMN_MASK)
            | ((bank as u32 & BANK_MASK) << BANK_SHIFT)
            | ((row as u32 & ROW_MASK) << ROW_SHIFT);
        Self(raw)
    }

    /// Returns the raw 21-bit value.
    #[inline(always)]
    pub fn val(&self) -> u32 {
        self.0
    }

    /// Column within the open row.
    #[inline(always)]
    pub fn column(&self) -> u16 {
        (self.0 & COLUMN_MASK) as u16
    }

    /// Bank index.
    #[inline(always)]
    pub fn bank(&self) -> u8 {
        ((self.0 >> BANK_SHIFT) & BANK_MASK) as u8
    }

    /// Row index.
    #[inline(always)]
    pub fn row(&self) -> u16 {
        ((self.0 >> ROW_SHIFT) & ROW_MASK) as u16
    }

    /// Value driven on A[10:0] with ACTIVE.
    pub fn row_pins(&self) -> u16 {
        self.row()
    }

    /// Value driven on A[10:0] with READ/WRITE. A10 stays low (no auto-precharge).
    pub fn column_pins(&self) -> u16 {
        self.column()
    }

    /// Returns the address `words` further on, wrapping at the top of memory.
    pub fn offset(&self, words: u32) -> Self {
        Self::new(self.0.wrapping_add(words))
    }
}

impl From<u32> for PageAddress {
    fn from(raw: u32) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for PageAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#08x} (bank {}, row {:#05x}, col {:#04x})",
            self.0,
            self.bank(),
            self.row(),
            self.column()
        )
    }
}
