//! Top-level Integration.
//!
//! `Top` owns the controller, the bus direction mux and the memory device
//! and advances them together, one clock edge per `tick`. It only wires
//! signals; it holds no protocol state of its own.
//!
//! Within a cycle:
//! 1. The controller's registered pins are on the wires.
//! 2. The mux resolves the data line from `dq_write_enable` and the device output.
//! 3. The device samples pins and line at the edge.
//! 4. The controller samples the requester inputs and the mux read data at
//!    the same edge and registers its outputs for the next cycle.

use tracing::{debug, info};

use crate::common::error::{ConfigError, SimError};
use crate::config::Config;
use crate::core::command::Command;
use crate::core::sequencer::{Controller, ControllerState};
use crate::core::signals::RequestSignals;
use crate::soc::memory::Sdram;
use crate::soc::mux::{BusDirectionMux, BusDriver, LineState};
use crate::soc::traits::{CycleObserver, MemoryDevice};
use crate::stats::SimStats;

/// Wire levels of one cycle, as seen by every component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleRecord {
    pub cycle: u64,
    pub state: ControllerState,
    pub command: Command,
    pub cke: bool,
    pub bank: u8,
    pub address: u16,
    pub dqm: u8,
    pub dq_write_enable: bool,
    pub line: LineState,
    pub driver: BusDriver,
    pub contention: bool,
    pub ready: bool,
    pub rd_inc_address: bool,
    pub wr_inc_address: bool,
    pub rd_data_out: u32,
    pub wr_data_in: u32,
}

/// Controller, mux and device clocked together.
pub struct Top {
    controller: Controller,
    mux: BusDirectionMux,
    device: Box<dyn MemoryDevice>,
    stats: SimStats,
    cycle: u64,
    history: Option<Vec<CycleRecord>>,
    observers: Vec<Box<dyn CycleObserver>>,
}

impl Top {
    /// Creates a system with the SDRAM device model.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulator configuration; the device checks the same timings
    ///   the controller is built for
    ///
    /// # Returns
    ///
    /// A system in its reset state, or the configuration error.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let timing = config.cycle_timing()?;
        Self::with_device(config, Box::new(Sdram::new(timing)))
    }

    /// Creates a system around an arbitrary memory device.
    pub fn with_device(
        config: &Config,
        device: Box<dyn MemoryDevice>,
    ) -> Result<Self, ConfigError> {
        let controller = Controller::new(config)?;
        info!(
            device = device.name(),
            init_cycles = controller.timing().init_cycles(),
            "system built"
        );
        Ok(Self {
            controller,
            mux: BusDirectionMux::new(),
            device,
            stats: SimStats::default(),
            cycle: 0,
            history: config.general.record_history.then(Vec::new),
            observers: Vec::new(),
        })
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn mux(&self) -> &BusDirectionMux {
        &self.mux
    }

    pub fn device(&self) -> &dyn MemoryDevice {
        self.device.as_ref()
    }

    pub fn device_mut(&mut self) -> &mut dyn MemoryDevice {
        self.device.as_mut()
    }

    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Index of the cycle currently on the wires.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Recorded cycles, oldest first. Empty when history is off.
    pub fn history(&self) -> &[CycleRecord] {
        self.history.as_deref().unwrap_or(&[])
    }

    /// Attaches an observer that sees every cycle from now on.
    pub fn attach(&mut self, observer: Box<dyn CycleObserver>) {
        self.observers.push(observer);
    }

    /// Advances the whole system by one clock edge.
    ///
    /// # Arguments
    ///
    /// * `inputs` - Requester inputs held during the current cycle
    ///
    /// # Returns
    ///
    /// An error when the device rejects the command stream or both sides
    /// drive the data line.
    pub fn tick(&mut self, inputs: &RequestSignals) -> Result<(), SimError> {
        let pins = *self.controller.pins();
        let outputs = *self.controller.outputs();
        let line = self
            .mux
            .resolve(pins.dq_write_enable, pins.dq_out, self.device.output());

        let record = CycleRecord {
            cycle: self.cycle,
            state: self.controller.state(),
            command: pins.command(),
            cke: pins.cke,
            bank: pins.bank,
            address: pins.address,
            dqm: pins.dqm,
            dq_write_enable: pins.dq_write_enable,
            line,
            driver: self.mux.driver(),
            contention: self.mux.contention(),
            ready: outputs.ready,
            rd_inc_address: outputs.rd_inc_address,
            wr_inc_address: outputs.wr_inc_address,
            rd_data_out: outputs.rd_data_out,
            wr_data_in: inputs.wr_data_in,
        };
        self.stats.record(&record);
        if let Some(history) = self.history.as_mut() {
            history.push(record);
        }
        for observer in self.observers.iter_mut() {
            observer.record(&record)?;
        }
        if record.contention {
            return Err(SimError::BusContention { cycle: self.cycle });
        }

        self.device.clk(&pins, line)?;
        self.controller.tick(inputs, self.mux.read_data());
        self.cycle += 1;
        Ok(())
    }

    /// Ticks with idle requester inputs until `ready` rises.
    ///
    /// # Returns
    ///
    /// The cycle in which `ready` is first high.
    pub fn run_until_ready(&mut self, limit: u64) -> Result<u64, SimError> {
        let idle = RequestSignals::default();
        let start = self.cycle;
        while !self.controller.is_ready() {
            if self.cycle - start >= limit {
                return Err(SimError::Timeout {
                    cycles: limit,
                    waiting_for: "ready",
                });
            }
            self.tick(&idle)?;
        }
        debug!(cycle = self.cycle, "controller ready");
        Ok(self.cycle)
    }

    /// Ticks `cycles` times with idle requester inputs.
    pub fn run_idle(&mut self, cycles: u64) -> Result<(), SimError> {
        let idle = RequestSignals::default();
        for _ in 0..cycles {
            self.tick(&idle)?;
        }
        Ok(())
    }

    /// Flushes attached probes.
    pub fn finish(&mut self) -> Result<(), SimError> {
        for observer in self.observers.iter_mut() {
            observer.finish()?;
        }
        Ok(())
    }
}
