//! SDRAM Command Encoding.
//!
//! Commands are encoded on the active-low CS#, RAS#, CAS# and WE# strobes.
//! A10 distinguishes PRECHARGE of one bank from PRECHARGE ALL.
//!
//! | Command   | CS# | RAS# | CAS# | WE# | A10 |
//! |-----------|-----|------|------|-----|-----|
//! | DESELECT  |  1  |  x   |  x   |  x  |  x  |
//! | NOP       |  0  |  1   |  1   |  1  |  x  |
//! | ACTIVE    |  0  |  0   |  1   |  1  | row |
//! | READ      |  0  |  1   |  0   |  1  |  0  |
//! | WRITE     |  0  |  1   |  0   |  0  |  0  |
//! | BURST STOP|  0  |  1   |  1   |  0  |  x  |
//! | PRECHARGE |  0  |  0   |  1   |  0  |  0  |
//! | PRE. ALL  |  0  |  0   |  1   |  0  |  1  |
//! | REFRESH   |  0  |  0   |  0   |  1  |  x  |
//! | LOAD MODE |  0  |  0   |  0   |  0  | op  |

use std::fmt;

use serde::Serialize;

/// Levels of the four command strobes (`true` = high).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strobes {
    pub cs_n: bool,
    pub ras_n: bool,
    pub cas_n: bool,
    pub we_n: bool,
}

/// A decoded SDRAM command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Command {
    #[default]
    Deselect,
    Nop,
    Active,
    Read,
    Write,
    BurstStop,
    Precharge,
    PrechargeAll,
    AutoRefresh,
    LoadModeRegister,
}

impl Command {
    /// Strobe levels that encode this command.
    pub fn strobes(self) -> Strobes {
        let (cs_n, ras_n, cas_n, we_n) = match self {
            Command::Deselect => (true, true, true, true),
            Command::Nop => (false, true, true, true),
            Command::Active => (false, false, true, true),
            Command::Read => (false, true, false, true),
            Command::Write => (false, true, false, false),
            Command::BurstStop => (false, true, true, false),
            Command::Precharge | Command::PrechargeAll => (false, false, true, false),
            Command::AutoRefresh => (false, false, false, true),
            Command::LoadModeRegister => (false, false, false, false),
        };
        Strobes {
            cs_n,
            ras_n,
            cas_n,
            we_n,
        }
    }

    /// Decodes the strobes sampled at a clock edge.
    ///
    /// # Arguments
    ///
    /// * `strobes` - CS#, RAS#, CAS#, WE# levels
    /// * `a10` - Level of address pin A10, only used to tell PRECHARGE ALL apart
    pub fn decode(strobes: Strobes, a10: bool) -> Self {
        if strobes.cs_n {
            return Command::Deselect;
        }
        match (strobes.ras_n, strobes.cas_n, strobes.we_n) {
            (true, true, true) => Command::Nop,
            (false, true, true) => Command::Active,
            (true, false, true) => Command::Read,
            (true, false, false) => Command::Write,
            (true, true, false) => Command::BurstStop,
            (false, true, false) if a10 => Command::PrechargeAll,
            (false, true, false) => Command::Precharge,
            (false, false, true) => Command::AutoRefresh,
            (false, false, false) => Command::LoadModeRegister,
        }
    }

    /// Whether the command leaves the device state unchanged.
    pub fn is_idle(self) -> bool {
        matches!(self, Command::Deselect | Command::Nop)
    }

    /// Short datasheet mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Command::Deselect => "DESL",
            Command::Nop => "NOP",
            Command::Active => "ACT",
            Command::Read => "RD",
            Command::Write => "WR",
            Command::BurstStop => "BST",
            Command::Precharge => "PRE",
            Command::PrechargeAll => "PREA",
            Command::AutoRefresh => "REF",
            Command::LoadModeRegister => "MRS",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
