//! Controller Signal Bundles.
//!
//! Groups the wires crossing the controller boundary: the registered device
//! pins, the requester inputs sampled at each edge and the registered
//! requester outputs.

use crate::common::constants::DQM_ALL_LANES;
use crate::core::command::{Command, Strobes};

/// Registered outputs toward the SDRAM and the bus mux.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DevicePins {
    pub cke: bool,
    pub cs_n: bool,
    pub ras_n: bool,
    pub cas_n: bool,
    pub we_n: bool,
    /// BA[1:0].
    pub bank: u8,
    /// A[10:0].
    pub address: u16,
    /// DQM[3:0], a set bit masks the lane.
    pub dqm: u8,
    /// Direction select for the bus mux.
    pub dq_write_enable: bool,
    /// Value offered to the mux while `dq_write_enable` is high.
    pub dq_out: u32,
}

impl Default for DevicePins {
    /// Reset levels: CKE low, DESELECT, all lanes masked, bus released.
    fn default() -> Self {
        let mut pins = Self {
            cke: false,
            cs_n: true,
            ras_n: true,
            cas_n: true,
            we_n: true,
            bank: 0,
            address: 0,
            dqm: DQM_ALL_LANES,
            dq_write_enable: false,
            dq_out: 0,
        };
        pins.set_command(Command::Deselect);
        pins
    }
}

impl DevicePins {
    /// Command currently encoded on the strobes.
    pub fn command(&self) -> Command {
        Command::decode(self.strobes(), self.address & (1 << 10) != 0)
    }

    pub fn strobes(&self) -> Strobes {
        Strobes {
            cs_n: self.cs_n,
            ras_n: self.ras_n,
            cas_n: self.cas_n,
            we_n: self.we_n,
        }
    }

    /// Drives the strobes for `command`; bank and address are left alone.
    pub fn set_command(&mut self, command: Command) {
        let s = command.strobes();
        self.cs_n = s.cs_n;
        self.ras_n = s.ras_n;
        self.cas_n = s.cas_n;
        self.we_n = s.we_n;
    }
}

/// Requester inputs, sampled by the controller at the clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestSignals {
    /// One-cycle pulse starting a page read.
    pub start_read: bool,
    pub read_address: u32,
    /// One-cycle pulse starting a page write.
    pub start_write: bool,
    pub write_address: u32,
    /// Word captured at the end of every cycle with `wr_inc_address` high.
    pub wr_data_in: u32,
}

impl RequestSignals {
    /// Inputs with a read start pulse.
    pub fn read(address: u32) -> Self {
        Self {
            start_read: true,
            read_address: address,
            ..Self::default()
        }
    }

    /// Inputs with a write start pulse and the first word presented.
    pub fn write(address: u32, first_word: u32) -> Self {
        Self {
            start_write: true,
            write_address: address,
            wr_data_in: first_word,
            ..Self::default()
        }
    }
}

/// Registered outputs toward the requester.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequesterOutputs {
    /// High in IDLE when a start pulse will be accepted.
    pub ready: bool,
    /// `rd_data_out` holds a new word this cycle.
    pub rd_inc_address: bool,
    /// `wr_data_in` is captured at the end of this cycle.
    pub wr_inc_address: bool,
    pub rd_data_out: u32,
    pub rd_in_progress: bool,
    pub wr_in_progress: bool,
}
