//! Address/Command Sequencer.
//!
//! The controller state machine. Once per clock edge it samples the requester
//! inputs and the bus mux read data, advances its phase and registers the
//! device pins and requester outputs for the next cycle.
//!
//! # Phases
//!
//! * `Init`: power-up, precharge all, init refreshes, load mode register.
//! * `Idle`: refresh when due, otherwise accept a start pulse.
//! * `Activate`: wait for the bank, ACTIVE, tRCD.
//! * `Read`: READ, CAS latency, one capture per beat.
//! * `Write`: WRITE, one beat per cycle, release the bus.
//! * `Precharge`: tRAS and write recovery, PRECHARGE, tRP.
//! * `Refresh`: AUTO-REFRESH, tRC.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::common::constants::DQM_ALL_LANES;
use crate::common::error::ConfigError;
use crate::common::{BurstKind, DataWidth, PageAddress};
use crate::config::Config;
use crate::core::bank::BankTracker;
use crate::core::command::Command;
use crate::core::init::InitSequence;
use crate::core::mode::ModeRegister;
use crate::core::refresh::RefreshScheduler;
use crate::core::signals::{DevicePins, RequestSignals, RequesterOutputs};
use crate::core::timing::Timing;

/// Externally visible controller state, one per cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ControllerState {
    Init,
    Idle,
    Activate,
    Read,
    Write,
    Precharge,
    Refresh,
}

impl ControllerState {
    /// Three-bit code used in waveform dumps.
    pub fn code(self) -> u8 {
        match self {
            ControllerState::Init => 0,
            ControllerState::Idle => 1,
            ControllerState::Activate => 2,
            ControllerState::Read => 3,
            ControllerState::Write => 4,
            ControllerState::Precharge => 5,
            ControllerState::Refresh => 6,
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A page burst accepted from the requester.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Request {
    pub kind: BurstKind,
    pub address: PageAddress,
    /// Words transferred before the controller closes the row.
    pub beats: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Init,
    Idle,
    Activate { opened: bool, wait: u32 },
    Read { latency: u32, captured: u32 },
    Write { driven: u32 },
    Precharge { issued: bool, wait: u32 },
    Refresh { wait: u32 },
}

/// SDRAM controller for one requester and one device.
pub struct Controller {
    timing: Timing,
    mode: ModeRegister,
    width: DataWidth,
    trace_commands: bool,

    phase: Phase,
    init: InitSequence,
    banks: BankTracker,
    refresh: RefreshScheduler,

    pins: DevicePins,
    outputs: RequesterOutputs,

    pending: Option<Request>,
    active: Option<Request>,
    write_latch: u32,
    cycle: u64,
}

impl Controller {
    /// Builds a controller in the reset state.
    ///
    /// Timing and geometry are frozen here; there are no setters.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated simulator configuration
    ///
    /// # Returns
    ///
    /// The controller, or the configuration error that prevents it from working.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let timing = config.cycle_timing()?;
        let width = config.interface.data_width()?;
        let mode = ModeRegister::new(config.interface.burst_length, timing.cas_latency as u8);
        Ok(Self {
            timing,
            mode,
            width,
            trace_commands: config.general.trace_commands,
            phase: Phase::Init,
            init: InitSequence::new(&timing, mode),
            banks: BankTracker::new(&timing),
            refresh: RefreshScheduler::new(timing.refi),
            pins: DevicePins::default(),
            outputs: RequesterOutputs::default(),
            pending: None,
            active: None,
            write_latch: 0,
            cycle: 0,
        })
    }

    /// Pins driven during the current cycle.
    pub fn pins(&self) -> &DevicePins {
        &self.pins
    }

    /// Requester outputs during the current cycle.
    pub fn outputs(&self) -> &RequesterOutputs {
        &self.outputs
    }

    pub fn state(&self) -> ControllerState {
        match self.phase {
            Phase::Init => ControllerState::Init,
            Phase::Idle => ControllerState::Idle,
            Phase::Activate { .. } => ControllerState::Activate,
            Phase::Read { .. } => ControllerState::Read,
            Phase::Write { .. } => ControllerState::Write,
            Phase::Precharge { .. } => ControllerState::Precharge,
            Phase::Refresh { .. } => ControllerState::Refresh,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.outputs.ready
    }

    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    pub fn mode(&self) -> &ModeRegister {
        &self.mode
    }

    pub fn data_width(&self) -> DataWidth {
        self.width
    }

    pub fn banks(&self) -> &BankTracker {
        &self.banks
    }

    pub fn refresh(&self) -> &RefreshScheduler {
        &self.refresh
    }

    /// Burst in flight, if any.
    pub fn active_request(&self) -> Option<Request> {
        self.active
    }

    /// Cycle whose closing edge the next `tick` processes.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Processes one rising clock edge.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Requester inputs held during the cycle that is ending
    /// * `read_data` - Value of the data line during that cycle, as seen by the mux
    pub fn tick(&mut self, inputs: &RequestSignals, read_data: u32) {
        self.banks.tick();
        self.refresh.tick();

        if self.outputs.wr_inc_address {
            self.write_latch = inputs.wr_data_in & self.width.word_mask();
        }
        self.sample_start(inputs);

        self.outputs.rd_inc_address = false;
        self.outputs.wr_inc_address = false;
        self.pins.set_command(Command::Nop);
        self.pins.bank = 0;
        self.pins.address = 0;
        self.pins.dqm = DQM_ALL_LANES;
        self.pins.dq_write_enable = false;

        let before = self.state();
        match self.phase {
            Phase::Init => self.step_init(),
            Phase::Idle => self.step_idle(),
            Phase::Activate { opened, wait } => self.step_activate(opened, wait),
            Phase::Read { latency, captured } => self.step_read(latency, captured, read_data),
            Phase::Write { driven } => self.step_write(driven),
            Phase::Precharge { issued, wait } => self.step_precharge(issued, wait),
            Phase::Refresh { wait } => self.step_refresh(wait),
        }
        let after = self.state();
        if before != after {
            debug!(cycle = self.cycle, from = %before, to = %after, "state change");
        }

        self.outputs.rd_in_progress =
            matches!(self.phase, Phase::Read { .. }) || self.outputs.rd_inc_address;
        self.outputs.wr_in_progress =
            matches!(self.phase, Phase::Write { .. }) || self.outputs.wr_inc_address;
        self.cycle += 1;
    }

    fn sample_start(&mut self, inputs: &RequestSignals) {
        if !inputs.start_read && !inputs.start_write {
            return;
        }
        if !self.outputs.ready || self.phase != Phase::Idle || self.pending.is_some() {
            warn!(
                cycle = self.cycle,
                state = %self.state(),
                "start pulse while not ready, ignored"
            );
            return;
        }

        let (kind, raw) = if inputs.start_read {
            if inputs.start_write {
                warn!(cycle = self.cycle, "read and write started together, serving the read");
            }
            (BurstKind::Read, inputs.read_address)
        } else {
            (BurstKind::Write, inputs.write_address)
        };
        let address = PageAddress::new(raw);
        let beats = self.mode.burst_length.beats_from(address.column());
        debug!(cycle = self.cycle, ?kind, %address, beats, "burst accepted");
        self.pending = Some(Request {
            kind,
            address,
            beats,
        });
    }

    fn issue(&mut self, command: Command, bank: u8, address: u16) {
        self.pins.set_command(command);
        self.pins.bank = bank;
        self.pins.address = address;
        if self.trace_commands && !command.is_idle() {
            trace!(
                cycle = self.cycle + 1,
                %command,
                bank,
                address = format_args!("{:#05x}", address),
                "command"
            );
        }
    }

    fn enter_idle(&mut self) {
        self.phase = Phase::Idle;
        self.active = None;
        self.outputs.ready = self.pending.is_none();
    }

    fn step_init(&mut self) {
        let action = self.init.step();
        self.pins.cke = action.cke;
        self.issue(action.command, 0, action.address);
        match action.command {
            Command::PrechargeAll => self.banks.precharge_all(),
            Command::AutoRefresh => {
                self.banks.refresh();
                self.refresh.issued();
            }
            _ => {}
        }
        if self.init.is_done() {
            debug!(cycle = self.cycle + 1, "initialization complete");
            self.enter_idle();
        }
    }

    fn step_idle(&mut self) {
        let deadline = match self.pending {
            Some(req) => !self.refresh.fits(self.timing.burst_bound(req.beats)),
            None => false,
        };
        if self.refresh.due() || deadline {
            self.start_refresh();
            return;
        }

        match self.pending.take() {
            Some(req) => {
                self.outputs.ready = false;
                self.active = Some(req);
                self.step_activate(false, 0);
            }
            None => self.outputs.ready = true,
        }
    }

    fn start_refresh(&mut self) {
        self.outputs.ready = false;
        self.issue(Command::AutoRefresh, 0, 0);
        self.banks.refresh();
        self.refresh.issued();
        match self.timing.rc.saturating_sub(1) {
            0 => self.enter_idle(),
            wait => self.phase = Phase::Refresh { wait },
        }
    }

    fn step_refresh(&mut self, wait: u32) {
        match wait.saturating_sub(1) {
            0 => self.enter_idle(),
            wait => self.phase = Phase::Refresh { wait },
        }
    }

    fn step_activate(&mut self, opened: bool, wait: u32) {
        let Some(req) = self.active else {
            self.enter_idle();
            return;
        };
        let bank = req.address.bank();

        if !opened {
            if self.banks.can_activate(bank) {
                self.issue(Command::Active, bank, req.address.row_pins());
                self.banks.activate(bank, req.address.row());
                self.enter_column_wait(req, self.timing.rcd.saturating_sub(1));
            } else {
                self.phase = Phase::Activate {
                    opened: false,
                    wait: 0,
                };
            }
        } else if wait > 0 {
            self.enter_column_wait(req, wait - 1);
        } else {
            self.issue_column(req);
        }
    }

    /// Waits `wait` more edges before the column command. A write asks for
    /// its first word one cycle ahead so it is on hand with WRITE.
    fn enter_column_wait(&mut self, req: Request, wait: u32) {
        self.phase = Phase::Activate { opened: true, wait };
        if wait == 0 && req.kind == BurstKind::Write {
            self.outputs.wr_inc_address = true;
        }
    }

    fn issue_column(&mut self, req: Request) {
        let bank = req.address.bank();
        match req.kind {
            BurstKind::Read => {
                self.issue(Command::Read, bank, req.address.column_pins());
                self.pins.dqm = self.width.dqm();
                self.phase = Phase::Read {
                    latency: self.timing.cas_latency,
                    captured: 0,
                };
            }
            BurstKind::Write => {
                self.issue(Command::Write, bank, req.address.column_pins());
                self.drive_beat();
                if req.beats > 1 {
                    self.outputs.wr_inc_address = true;
                } else {
                    self.banks.record_write(bank);
                }
                self.phase = Phase::Write { driven: 1 };
            }
        }
    }

    fn drive_beat(&mut self) {
        self.pins.dq_write_enable = true;
        self.pins.dq_out = self.write_latch;
        self.pins.dqm = self.width.dqm();
    }

    fn step_read(&mut self, latency: u32, captured: u32, read_data: u32) {
        let Some(req) = self.active else {
            self.enter_idle();
            return;
        };
        self.pins.dqm = self.width.dqm();

        if latency > 0 {
            self.phase = Phase::Read {
                latency: latency - 1,
                captured,
            };
            return;
        }

        self.outputs.rd_data_out = read_data & self.width.word_mask();
        self.outputs.rd_inc_address = true;
        let captured = captured + 1;
        if captured >= req.beats {
            self.pins.dqm = DQM_ALL_LANES;
            self.phase = Phase::Precharge {
                issued: false,
                wait: 0,
            };
        } else {
            self.phase = Phase::Read {
                latency: 0,
                captured,
            };
        }
    }

    fn step_write(&mut self, driven: u32) {
        let Some(req) = self.active else {
            self.enter_idle();
            return;
        };

        if driven < req.beats {
            self.drive_beat();
            let driven = driven + 1;
            if driven < req.beats {
                self.outputs.wr_inc_address = true;
            } else {
                self.banks.record_write(req.address.bank());
            }
            self.phase = Phase::Write { driven };
        } else {
            // Bus released and every lane masked so a longer device burst stops writing.
            self.phase = Phase::Precharge {
                issued: false,
                wait: 0,
            };
        }
    }

    fn step_precharge(&mut self, issued: bool, wait: u32) {
        let Some(req) = self.active else {
            self.enter_idle();
            return;
        };
        let bank = req.address.bank();

        let remaining = if issued {
            wait.saturating_sub(1)
        } else if self.banks.can_precharge(bank) {
            self.issue(Command::Precharge, bank, 0);
            self.banks.precharge(bank);
            self.timing.rp.saturating_sub(1)
        } else {
            return;
        };

        if remaining == 0 {
            self.enter_idle();
        } else {
            self.phase = Phase::Precharge {
                issued: true,
                wait: remaining,
            };
        }
    }
}
