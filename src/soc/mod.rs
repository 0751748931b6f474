//! Top-level integration: the bus mux, the memory device and the wiring
//! that clocks them together with the controller.

/// Cycle-by-cycle wiring of controller, mux and device.
pub mod builder;

/// Memory device models.
pub mod memory;

/// Bidirectional data line resolution.
pub mod mux;

/// Device and observer interfaces.
pub mod traits;

pub use builder::{CycleRecord, Top};
pub use mux::{BusDirectionMux, BusDriver, LineState};
pub use traits::{CycleObserver, MemoryDevice};
