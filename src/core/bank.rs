//! Bank Tracker.
//!
//! Keeps the controller's view of the four banks: which row is open and how
//! many edges remain before each bank-level constraint is met. Countdowns are
//! armed at the edge that schedules a command and decremented at the start of
//! every later edge, so a value of zero means the next command may follow.

use crate::common::constants::BANK_COUNT;
use crate::core::timing::Timing;

#[derive(Clone, Copy, Debug, Default)]
struct BankState {
    open_row: Option<u16>,
    /// ACTIVE/REFRESH to ACTIVE.
    rc_remaining: u32,
    /// ACTIVE to PRECHARGE.
    ras_remaining: u32,
    /// Last write beat to PRECHARGE.
    wr_remaining: u32,
    /// PRECHARGE to ACTIVE.
    rp_remaining: u32,
}

/// Controller-side state of every bank.
#[derive(Clone, Debug)]
pub struct BankTracker {
    banks: [BankState; BANK_COUNT],
    rrd_remaining: u32,
    rc: u32,
    ras: u32,
    rrd: u32,
    wr: u32,
    rp: u32,
}

impl BankTracker {
    pub fn new(timing: &Timing) -> Self {
        Self {
            banks: [BankState::default(); BANK_COUNT],
            rrd_remaining: 0,
            rc: timing.rc,
            ras: timing.ras,
            rrd: timing.rrd,
            wr: timing.wr,
            rp: timing.rp,
        }
    }

    /// Advances every countdown by one edge.
    pub fn tick(&mut self) {
        for bank in self.banks.iter_mut() {
            bank.rc_remaining = bank.rc_remaining.saturating_sub(1);
            bank.ras_remaining = bank.ras_remaining.saturating_sub(1);
            bank.wr_remaining = bank.wr_remaining.saturating_sub(1);
            bank.rp_remaining = bank.rp_remaining.saturating_sub(1);
        }
        self.rrd_remaining = self.rrd_remaining.saturating_sub(1);
    }

    /// Whether ACTIVE may be scheduled for `bank` at this edge.
    pub fn can_activate(&self, bank: u8) -> bool {
        let b = &self.banks[bank as usize];
        b.open_row.is_none()
            && b.rc_remaining == 0
            && b.rp_remaining == 0
            && self.rrd_remaining == 0
    }

    /// Records an ACTIVE scheduled at this edge.
    pub fn activate(&mut self, bank: u8, row: u16) {
        let b = &mut self.banks[bank as usize];
        b.open_row = Some(row);
        b.rc_remaining = self.rc;
        b.ras_remaining = self.ras;
        self.rrd_remaining = self.rrd;
    }

    /// Records the last write beat scheduled at this edge.
    pub fn record_write(&mut self, bank: u8) {
        self.banks[bank as usize].wr_remaining = self.wr;
    }

    /// Whether PRECHARGE may be scheduled for `bank` at this edge.
    pub fn can_precharge(&self, bank: u8) -> bool {
        let b = &self.banks[bank as usize];
        b.ras_remaining == 0 && b.wr_remaining == 0
    }

    /// Records a PRECHARGE of `bank` scheduled at this edge.
    pub fn precharge(&mut self, bank: u8) {
        let b = &mut self.banks[bank as usize];
        b.open_row = None;
        b.rp_remaining = self.rp;
    }

    /// Records a PRECHARGE ALL scheduled at this edge.
    pub fn precharge_all(&mut self) {
        for bank in 0..BANK_COUNT as u8 {
            self.precharge(bank);
        }
    }

    /// Records an AUTO-REFRESH; no bank may be activated for tRC.
    pub fn refresh(&mut self) {
        for bank in self.banks.iter_mut() {
            bank.rc_remaining = self.rc;
        }
    }

    /// Row currently open in `bank`.
    pub fn open_row(&self, bank: u8) -> Option<u16> {
        self.banks[bank as usize].open_row
    }

    /// True when no bank has an open row.
    pub fn all_idle(&self) -> bool {
        self.banks.iter().all(|b| b.open_row.is_none())
    }
}
