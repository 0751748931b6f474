//! Behavioural SDR SDRAM.
//!
//! Models a 4-bank, 2048-row, 256-column, 32-bit part clocked by the
//! controller. Commands are registered at the rising edge; read data leaves
//! the device CAS-latency cycles after READ and write data is sampled with
//! WRITE and on every following burst beat.
//!
//! Every constraint the datasheet places on the command stream is checked as
//! it happens and reported as a `DeviceError` instead of silently corrupting
//! data.

use std::collections::VecDeque;

use tracing::trace;

use crate::common::constants::{
    A10, BANK_COUNT, COLUMN_ADDRESS_WIDTH, DQM_ALL_LANES, ROW_ADDRESS_WIDTH,
};
use crate::common::error::DeviceError;
use crate::core::command::Command;
use crate::core::mode::{BurstLength, BurstType, ModeRegister, WriteBurstMode};
use crate::core::signals::DevicePins;
use crate::core::timing::Timing;
use crate::soc::memory::bank::Bank;
use crate::soc::mux::LineState;
use crate::soc::traits::MemoryDevice;

const ROW_PIN_MASK: u16 = (1 << ROW_ADDRESS_WIDTH) - 1;
const COLUMN_PIN_MASK: u16 = (1 << COLUMN_ADDRESS_WIDTH) - 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BurstDir {
    Read,
    Write,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Burst {
    dir: BurstDir,
    bank: u8,
    row: u16,
    start: u16,
    index: u32,
    /// `None` runs until PRECHARGE or BURST STOP (full page).
    length: Option<u32>,
    interleaved: bool,
}

impl Burst {
    fn column(&self) -> u16 {
        match self.length {
            None => ((self.start as u32 + self.index) & COLUMN_PIN_MASK as u32) as u16,
            Some(len) => {
                let wrap = len - 1;
                let base = self.start as u32 & !wrap;
                let offset = if self.interleaved {
                    (self.start as u32 & wrap) ^ self.index
                } else {
                    (self.start as u32 + self.index) & wrap
                };
                (base | (offset & wrap)) as u16
            }
        }
    }

    fn finished(&self) -> bool {
        matches!(self.length, Some(len) if self.index >= len)
    }
}

/// SDRAM device model.
pub struct Sdram {
    timing: Timing,
    cycle: u64,
    cke_prev: bool,
    banks: [Bank; BANK_COUNT],

    mode: Option<ModeRegister>,
    precharged_all: bool,
    refresh_count: u64,
    last_refresh: Option<u64>,
    last_mode: Option<u64>,
    last_activate: Option<u64>,
    last_precharge: Option<u64>,

    burst: Option<Burst>,
    read_pipeline: VecDeque<Option<u32>>,
    output: Option<u32>,
    dqm_prev: u8,
}

impl Sdram {
    /// Creates a powered-up device with unknown mode and closed banks.
    ///
    /// # Arguments
    ///
    /// * `timing` - Datasheet constraints the device enforces, in cycles
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            cycle: 0,
            cke_prev: false,
            banks: Default::default(),
            mode: None,
            precharged_all: false,
            refresh_count: 0,
            last_refresh: None,
            last_mode: None,
            last_activate: None,
            last_precharge: None,
            burst: None,
            read_pipeline: VecDeque::new(),
            output: None,
            dqm_prev: DQM_ALL_LANES,
        }
    }

    /// Mode register contents, once loaded.
    pub fn mode(&self) -> Option<&ModeRegister> {
        self.mode.as_ref()
    }

    /// True once PRECHARGE ALL, two refreshes and LOAD MODE have been seen.
    pub fn is_initialized(&self) -> bool {
        self.precharged_all && self.mode.is_some() && self.refresh_count >= 2
    }

    pub fn open_row(&self, bank: u8) -> Option<u16> {
        self.banks[bank as usize].open_row()
    }

    /// AUTO-REFRESH commands received since reset.
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    /// Cycle the next `clk` call closes.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    fn since(
        &self,
        at: Option<u64>,
        required: u32,
        parameter: &'static str,
        bank: u8,
    ) -> Result<(), DeviceError> {
        if let Some(at) = at {
            let elapsed = self.cycle - at;
            if elapsed < required as u64 {
                return Err(DeviceError::Timing {
                    cycle: self.cycle,
                    parameter,
                    bank,
                    elapsed,
                    required: required as u64,
                });
            }
        }
        Ok(())
    }

    fn require_initialized(&self, command: Command) -> Result<(), DeviceError> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(DeviceError::NotInitialized {
                cycle: self.cycle,
                command,
            })
        }
    }

    fn require_all_idle(&self, command: Command) -> Result<(), DeviceError> {
        match self.banks.iter().position(|b| b.open_row().is_some()) {
            Some(bank) => Err(DeviceError::BankOpen {
                cycle: self.cycle,
                bank: bank as u8,
                command,
            }),
            None => Ok(()),
        }
    }

    fn execute(&mut self, command: Command, pins: &DevicePins) -> Result<(), DeviceError> {
        if command.is_idle() {
            return Ok(());
        }
        if self.cycle < self.timing.power_up as u64 {
            return Err(DeviceError::PowerUp {
                cycle: self.cycle,
                command,
                elapsed: self.cycle,
                required: self.timing.power_up as u64,
            });
        }
        trace!(
            cycle = self.cycle,
            %command,
            bank = pins.bank,
            address = pins.address,
            "device command"
        );

        let bank = pins.bank & (BANK_COUNT as u8 - 1);
        match command {
            Command::Active => self.activate(bank, pins.address & ROW_PIN_MASK),
            Command::Read | Command::Write => self.column_command(command, bank, pins.address),
            Command::Precharge => {
                self.precharge(bank)?;
                self.last_precharge = Some(self.cycle);
                Ok(())
            }
            Command::PrechargeAll => {
                for b in 0..BANK_COUNT as u8 {
                    self.precharge(b)?;
                }
                self.precharged_all = true;
                self.last_precharge = Some(self.cycle);
                Ok(())
            }
            Command::AutoRefresh => self.auto_refresh(),
            Command::LoadModeRegister => self.load_mode(pins.address),
            Command::BurstStop => {
                self.burst = None;
                Ok(())
            }
            Command::Deselect | Command::Nop => Ok(()),
        }
    }

    fn activate(&mut self, bank: u8, row: u16) -> Result<(), DeviceError> {
        self.require_initialized(Command::Active)?;
        let b = &self.banks[bank as usize];
        if let Some(open) = b.open_row() {
            return Err(DeviceError::BankAlreadyActive {
                cycle: self.cycle,
                bank,
                row: open,
            });
        }
        self.since(b.activated_at(), self.timing.rc, "tRC", bank)?;
        self.since(b.precharged_at(), self.timing.rp, "tRP", bank)?;
        self.since(self.last_activate, self.timing.rrd, "tRRD", bank)?;
        self.since(self.last_refresh, self.timing.rc, "tRC", bank)?;
        self.since(self.last_mode, self.timing.mrd, "tMRD", bank)?;

        self.banks[bank as usize].activate(row, self.cycle);
        self.last_activate = Some(self.cycle);
        Ok(())
    }

    fn column_command(
        &mut self,
        command: Command,
        bank: u8,
        address: u16,
    ) -> Result<(), DeviceError> {
        self.require_initialized(command)?;
        if address & A10 != 0 {
            return Err(DeviceError::AutoPrecharge {
                cycle: self.cycle,
                command,
            });
        }
        let b = &self.banks[bank as usize];
        let Some(row) = b.open_row() else {
            return Err(DeviceError::BankNotActive {
                cycle: self.cycle,
                bank,
                command,
            });
        };
        self.since(b.activated_at(), self.timing.rcd, "tRCD", bank)?;

        let Some(mode) = self.mode else {
            return Err(DeviceError::NotInitialized {
                cycle: self.cycle,
                command,
            });
        };
        let dir = if command == Command::Read {
            BurstDir::Read
        } else {
            BurstDir::Write
        };
        let length = match (dir, mode.write_burst_mode, mode.burst_length) {
            (BurstDir::Write, WriteBurstMode::SingleLocation, _) => Some(1),
            (_, _, BurstLength::FullPage) => None,
            (_, _, bl) => Some(bl.block_words()),
        };
        self.burst = Some(Burst {
            dir,
            bank,
            row,
            start: address & COLUMN_PIN_MASK,
            index: 0,
            length,
            interleaved: mode.burst_type == BurstType::Interleaved,
        });
        Ok(())
    }

    fn precharge(&mut self, bank: u8) -> Result<(), DeviceError> {
        let b = &self.banks[bank as usize];
        if b.open_row().is_some() {
            self.since(b.activated_at(), self.timing.ras, "tRAS", bank)?;
            self.since(b.last_write_at(), self.timing.wr, "tWR", bank)?;
        }
        self.banks[bank as usize].precharge(self.cycle);
        if matches!(self.burst, Some(burst) if burst.bank == bank) {
            self.burst = None;
        }
        Ok(())
    }

    fn auto_refresh(&mut self) -> Result<(), DeviceError> {
        self.require_all_idle(Command::AutoRefresh)?;
        self.since(self.last_precharge, self.timing.rp, "tRP", 0)?;
        self.since(self.last_refresh, self.timing.rc, "tRC", 0)?;
        self.since(self.last_mode, self.timing.mrd, "tMRD", 0)?;
        self.last_refresh = Some(self.cycle);
        self.refresh_count += 1;
        Ok(())
    }

    fn load_mode(&mut self, value: u16) -> Result<(), DeviceError> {
        self.require_all_idle(Command::LoadModeRegister)?;
        self.since(self.last_precharge, self.timing.rp, "tRP", 0)?;
        self.since(self.last_refresh, self.timing.rc, "tRC", 0)?;
        let mode = ModeRegister::decode(value).ok_or(DeviceError::InvalidMode {
            cycle: self.cycle,
            value,
        })?;
        self.read_pipeline = std::iter::repeat(None)
            .take(mode.cas_latency as usize - 1)
            .collect();
        self.mode = Some(mode);
        self.last_mode = Some(self.cycle);
        Ok(())
    }

    /// Runs one burst beat for the cycle being closed and returns read data
    /// headed for the output pipeline.
    fn burst_beat(
        &mut self,
        pins: &DevicePins,
        line: LineState,
    ) -> Result<Option<u32>, DeviceError> {
        let Some(mut burst) = self.burst else {
            return Ok(None);
        };
        let column = burst.column();
        let bank = &mut self.banks[burst.bank as usize];
        let data = match burst.dir {
            BurstDir::Read => Some(bank.read(burst.row, column)),
            BurstDir::Write => {
                let lanes = !pins.dqm & DQM_ALL_LANES;
                if lanes != 0 {
                    match line {
                        LineState::Driven(value) => {
                            bank.write(burst.row, column, value, lanes, self.cycle)
                        }
                        LineState::HighZ => {
                            return Err(DeviceError::UndrivenWrite {
                                cycle: self.cycle,
                                column,
                            })
                        }
                    }
                }
                None
            }
        };
        burst.index += 1;
        self.burst = if burst.finished() { None } else { Some(burst) };
        Ok(data)
    }

    fn mask_output(value: Option<u32>, dqm: u8) -> Option<u32> {
        let value = value?;
        if dqm & DQM_ALL_LANES == DQM_ALL_LANES {
            return None;
        }
        let mut masked = value;
        for lane in 0..4 {
            if dqm & (1 << lane) != 0 {
                masked |= 0xFF << (lane * 8);
            }
        }
        Some(masked)
    }
}

impl MemoryDevice for Sdram {
    fn name(&self) -> &str {
        "SDR SDRAM 4x2048x256x32"
    }

    fn output(&self) -> Option<u32> {
        self.output
    }

    fn clk(&mut self, pins: &DevicePins, line: LineState) -> Result<(), DeviceError> {
        let command = if self.cke_prev {
            pins.command()
        } else {
            Command::Deselect
        };
        self.execute(command, pins)?;

        let beat = self.burst_beat(pins, line)?;
        self.read_pipeline.push_back(beat);
        let next = self.read_pipeline.pop_front().flatten();
        // DQM gates read data two cycles after it is sampled.
        self.output = Self::mask_output(next, self.dqm_prev);
        self.dqm_prev = pins.dqm;

        if self.is_initialized() {
            if let Some(last) = self.last_refresh {
                let elapsed = self.cycle - last;
                if elapsed > self.timing.refi as u64 {
                    return Err(DeviceError::RefreshOverdue {
                        cycle: self.cycle,
                        elapsed,
                        limit: self.timing.refi as u64,
                    });
                }
            }
        }

        self.cke_prev = pins.cke;
        self.cycle += 1;
        Ok(())
    }

    fn peek(&self, bank: u8, row: u16, column: u16) -> u32 {
        self.banks[bank as usize].read(row, column)
    }

    fn poke(&mut self, bank: u8, row: u16, column: u16, value: u32) {
        self.banks[bank as usize].poke(row, column, value);
    }
}
