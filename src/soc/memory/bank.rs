//! SDRAM device bank.
//!
//! Storage is sparse: only written cells are kept. Each bank also records
//! the cycle of its last ACTIVE, PRECHARGE and write beat so the device can
//! check the row-level timing constraints.

use std::collections::HashMap;

use crate::common::constants::COLUMN_ADDRESS_WIDTH;

#[derive(Clone, Debug, Default)]
pub struct Bank {
    open_row: Option<u16>,
    activated_at: Option<u64>,
    precharged_at: Option<u64>,
    last_write_at: Option<u64>,
    cells: HashMap<u32, u32>,
}

fn cell(row: u16, column: u16) -> u32 {
    ((row as u32) << COLUMN_ADDRESS_WIDTH) | column as u32
}

impl Bank {
    pub fn open_row(&self) -> Option<u16> {
        self.open_row
    }

    pub fn activated_at(&self) -> Option<u64> {
        self.activated_at
    }

    pub fn precharged_at(&self) -> Option<u64> {
        self.precharged_at
    }

    /// Last write beat since the row was opened.
    pub fn last_write_at(&self) -> Option<u64> {
        match (self.last_write_at, self.activated_at) {
            (Some(w), Some(a)) if w >= a => Some(w),
            _ => None,
        }
    }

    pub fn activate(&mut self, row: u16, cycle: u64) {
        self.open_row = Some(row);
        self.activated_at = Some(cycle);
    }

    /// Closes the row. A bank that is already idle keeps its old stamp.
    pub fn precharge(&mut self, cycle: u64) {
        if self.open_row.take().is_some() {
            self.precharged_at = Some(cycle);
        }
    }

    pub fn read(&self, row: u16, column: u16) -> u32 {
        self.cells.get(&cell(row, column)).copied().unwrap_or(0)
    }

    /// Merges the byte lanes selected by `lanes` (bit n = byte n) into a cell.
    pub fn write(&mut self, row: u16, column: u16, value: u32, lanes: u8, cycle: u64) {
        let mut mask = 0u32;
        for lane in 0..4 {
            if lanes & (1 << lane) != 0 {
                mask |= 0xFF << (lane * 8);
            }
        }
        let slot = self.cells.entry(cell(row, column)).or_insert(0);
        *slot = (*slot & !mask) | (value & mask);
        self.last_write_at = Some(cycle);
    }

    /// Stores a full word without touching timing state.
    pub fn poke(&mut self, row: u16, column: u16, value: u32) {
        self.cells.insert(cell(row, column), value);
    }
}
