//! SDRAM controller core.
//!
//! The sequencer and the pieces it is built from: command encoding, the
//! mode register, cycle timing, bank bookkeeping, the refresh scheduler and
//! the power-up sequence.

/// Controller-side bank state and countdowns.
pub mod bank;

/// Command strobe encoding.
pub mod command;

/// Power-up initialization sequence.
pub mod init;

/// Mode register layout.
pub mod mode;

/// Refresh interval tracking.
pub mod refresh;

/// Controller state machine.
pub mod sequencer;

/// Pin and requester signal bundles.
pub mod signals;

/// Datasheet timings in clock cycles.
pub mod timing;

pub use command::Command;
pub use mode::{BurstLength, ModeRegister};
pub use sequencer::{Controller, ControllerState, Request};
pub use signals::{DevicePins, RequestSignals, RequesterOutputs};
pub use timing::Timing;
