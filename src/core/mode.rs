//! Mode Register.
//!
//! Layout of the value loaded through A[10:0] with LOAD MODE REGISTER:
//!
//! * A2:A0  burst length (0=1, 1=2, 2=4, 3=8, 7=full page)
//! * A3     burst type (0=sequential, 1=interleaved)
//! * A6:A4  CAS latency (2 or 3)
//! * A8:A7  operating mode (00=standard)
//! * A9     write burst mode (0=programmed burst, 1=single location)

use serde::{Deserialize, Serialize};

use crate::common::constants::PAGE_WORDS;

/// Programmed burst length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum BurstLength {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "4")]
    Four,
    #[default]
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "full-page")]
    FullPage,
}

impl BurstLength {
    /// Mode register field value (A2:A0).
    pub fn code(self) -> u16 {
        match self {
            BurstLength::One => 0,
            BurstLength::Two => 1,
            BurstLength::Four => 2,
            BurstLength::Eight => 3,
            BurstLength::FullPage => 7,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(BurstLength::One),
            1 => Some(BurstLength::Two),
            2 => Some(BurstLength::Four),
            3 => Some(BurstLength::Eight),
            7 => Some(BurstLength::FullPage),
            _ => None,
        }
    }

    /// Size of the block a burst wraps within, in words.
    pub fn block_words(self) -> u32 {
        match self {
            BurstLength::One => 1,
            BurstLength::Two => 2,
            BurstLength::Four => 4,
            BurstLength::Eight => 8,
            BurstLength::FullPage => PAGE_WORDS,
        }
    }

    /// Words a controller burst starting at `column` transfers.
    ///
    /// A burst runs from `column` to the end of its block: the end of the
    /// aligned group for fixed lengths, the end of the row for full page.
    pub fn beats_from(self, column: u16) -> u32 {
        let block = self.block_words();
        block - (column as u32 % block)
    }
}

/// Burst address ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BurstType {
    #[default]
    Sequential,
    Interleaved,
}

/// Whether writes use the programmed burst length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WriteBurstMode {
    #[default]
    ProgrammedBurst,
    SingleLocation,
}

/// Decoded mode register contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeRegister {
    pub burst_length: BurstLength,
    pub burst_type: BurstType,
    pub cas_latency: u8,
    pub write_burst_mode: WriteBurstMode,
}

impl ModeRegister {
    /// Mode used by the controller: sequential bursts in both directions.
    pub fn new(burst_length: BurstLength, cas_latency: u8) -> Self {
        Self {
            burst_length,
            burst_type: BurstType::Sequential,
            cas_latency,
            write_burst_mode: WriteBurstMode::ProgrammedBurst,
        }
    }

    /// Packs the register into the A[10:0] value.
    pub fn encode(&self) -> u16 {
        let mut value = self.burst_length.code();
        if self.burst_type == BurstType::Interleaved {
            value |= 1 << 3;
        }
        value |= (self.cas_latency as u16 & 0x7) << 4;
        if self.write_burst_mode == WriteBurstMode::SingleLocation {
            value |= 1 << 9;
        }
        value
    }

    /// Unpacks an A[10:0] value.
    ///
    /// # Returns
    ///
    /// `None` for reserved burst lengths, CAS latencies other than 2 or 3,
    /// or a non-standard operating mode.
    pub fn decode(value: u16) -> Option<Self> {
        let burst_length = BurstLength::from_code(value & 0x7)?;
        let burst_type = if value & (1 << 3) != 0 {
            BurstType::Interleaved
        } else {
            BurstType::Sequential
        };
        let cas_latency = ((value >> 4) & 0x7) as u8;
        if !(2..=3).contains(&cas_latency) {
            return None;
        }
        if (value >> 7) & 0x3 != 0 {
            return None;
        }
        let write_burst_mode = if value & (1 << 9) != 0 {
            WriteBurstMode::SingleLocation
        } else {
            WriteBurstMode::ProgrammedBurst
        };
        Some(Self {
            burst_length,
            burst_type,
            cas_latency,
            write_burst_mode,
        })
    }
}
