//! Power-up Initialization Sequence.
//!
//! The device needs, in order: a stable clock with CKE low for the power-up
//! delay, PRECHARGE ALL, at least two AUTO-REFRESH cycles and a LOAD MODE
//! REGISTER before the first ACTIVE. Each call to [`InitSequence::step`]
//! yields the pin action for the next cycle.

use crate::common::constants::A10;
use crate::core::command::Command;
use crate::core::mode::ModeRegister;
use crate::core::timing::Timing;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitStep {
    /// CKE low, DESELECT.
    PowerUp { remaining: u32 },
    /// One NOP with CKE high so the first command is registered.
    Wake,
    PrechargeAll,
    PrechargeWait { remaining: u32 },
    Refresh { issued: u32 },
    RefreshWait { remaining: u32, issued: u32 },
    LoadMode,
    ModeWait { remaining: u32 },
    Done,
}

/// Pin levels requested by the init sequence for the next cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitAction {
    pub command: Command,
    pub cke: bool,
    pub address: u16,
}

impl InitAction {
    fn new(command: Command, cke: bool, address: u16) -> Self {
        Self {
            command,
            cke,
            address,
        }
    }
}

#[derive(Clone, Debug)]
pub struct InitSequence {
    step: InitStep,
    rp: u32,
    rc: u32,
    mrd: u32,
    refreshes: u32,
    mode: u16,
}

impl InitSequence {
    pub fn new(timing: &Timing, mode: ModeRegister) -> Self {
        Self {
            step: InitStep::PowerUp {
                remaining: timing.power_up,
            },
            rp: timing.rp,
            rc: timing.rc,
            mrd: timing.mrd,
            refreshes: timing.init_refreshes,
            mode: mode.encode(),
        }
    }

    pub fn current(&self) -> InitStep {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.step == InitStep::Done
    }

    /// Advances one edge and returns the action for the next cycle.
    pub fn step(&mut self) -> InitAction {
        let (action, next) = match self.step {
            InitStep::PowerUp { remaining } => {
                let remaining = remaining.saturating_sub(1);
                let next = if remaining == 0 {
                    InitStep::Wake
                } else {
                    InitStep::PowerUp { remaining }
                };
                (InitAction::new(Command::Deselect, false, 0), next)
            }
            InitStep::Wake => (InitAction::new(Command::Nop, true, 0), InitStep::PrechargeAll),
            InitStep::PrechargeAll => (
                InitAction::new(Command::PrechargeAll, true, A10),
                self.wait_or(
                    self.rp,
                    |remaining| InitStep::PrechargeWait { remaining },
                    InitStep::Refresh { issued: 0 },
                ),
            ),
            InitStep::PrechargeWait { remaining } => (
                InitAction::new(Command::Nop, true, 0),
                self.wait_or(
                    remaining,
                    |remaining| InitStep::PrechargeWait { remaining },
                    InitStep::Refresh { issued: 0 },
                ),
            ),
            InitStep::Refresh { issued } => {
                let issued = issued + 1;
                (
                    InitAction::new(Command::AutoRefresh, true, 0),
                    self.wait_or(
                        self.rc,
                        |remaining| InitStep::RefreshWait { remaining, issued },
                        self.after_refresh(issued),
                    ),
                )
            }
            InitStep::RefreshWait { remaining, issued } => (
                InitAction::new(Command::Nop, true, 0),
                self.wait_or(
                    remaining,
                    |remaining| InitStep::RefreshWait { remaining, issued },
                    self.after_refresh(issued),
                ),
            ),
            InitStep::LoadMode => (
                InitAction::new(Command::LoadModeRegister, true, self.mode),
                self.wait_or(
                    self.mrd,
                    |remaining| InitStep::ModeWait { remaining },
                    InitStep::Done,
                ),
            ),
            InitStep::ModeWait { remaining } => (
                InitAction::new(Command::Nop, true, 0),
                self.wait_or(
                    remaining,
                    |remaining| InitStep::ModeWait { remaining },
                    InitStep::Done,
                ),
            ),
            InitStep::Done => (InitAction::new(Command::Nop, true, 0), InitStep::Done),
        };
        self.step = next;
        action
    }

    /// A command followed by `cycles` of spacing leaves `cycles - 1` NOPs;
    /// the following step is entered once the countdown reaches zero.
    fn wait_or(&self, cycles: u32, wait: impl Fn(u32) -> InitStep, then: InitStep) -> InitStep {
        match cycles.saturating_sub(1) {
            0 => then,
            remaining => wait(remaining),
        }
    }

    fn after_refresh(&self, issued: u32) -> InitStep {
        if issued < self.refreshes {
            InitStep::Refresh { issued }
        } else {
            InitStep::LoadMode
        }
    }
}
