//! Device geometry and bus constants.
//!
//! The modelled part is a 4-bank SDR SDRAM with an 11-bit row address,
//! an 8-bit column address and a 32-bit data bus (2M words in total).

/// Number of internal banks.
pub const BANK_COUNT: usize = 4;

/// Width of the bank select field (BA[1:0]).
pub const BANK_ADDRESS_WIDTH: u32 = 2;

/// Width of the row address (A[10:0] during ACTIVE).
pub const ROW_ADDRESS_WIDTH: u32 = 11;

/// Width of the column address (A[7:0] during READ/WRITE).
pub const COLUMN_ADDRESS_WIDTH: u32 = 8;

/// Width of a requester page address: column, bank and row combined.
pub const PAGE_ADDRESS_WIDTH: u32 =
    COLUMN_ADDRESS_WIDTH + BANK_ADDRESS_WIDTH + ROW_ADDRESS_WIDTH;

/// Mask covering every valid page address bit.
pub const PAGE_ADDRESS_MASK: u32 = (1 << PAGE_ADDRESS_WIDTH) - 1;

/// Number of words in one open row.
pub const PAGE_WORDS: u32 = 1 << COLUMN_ADDRESS_WIDTH;

/// Address pin that selects auto-precharge (READ/WRITE) or all banks (PRECHARGE).
pub const A10: u16 = 1 << 10;

/// DQM value that masks every byte lane.
pub const DQM_ALL_LANES: u8 = 0xF;

/// Value seen on the data line while no one drives it (pull-ups).
pub const FLOATING_BUS: u32 = u32::MAX;

/// Cycles of slack kept between a scheduled refresh and its deadline.
pub const REFRESH_MARGIN: u32 = 4;
