//! Simulation statistics collection and reporting.
//!
//! Tracks cycle counts, commands by kind, burst traffic, refresh spacing and
//! data bus ownership from the per-cycle wire levels.

use std::time::Instant;

use serde::Serialize;

use crate::core::command::Command;
use crate::soc::builder::CycleRecord;
use crate::soc::mux::BusDriver;

/// Commands observed on the pins, by kind.
#[derive(Clone, Debug, Default, Serialize)]
pub struct CommandCounts {
    pub activate: u64,
    pub read: u64,
    pub write: u64,
    pub precharge: u64,
    pub precharge_all: u64,
    pub auto_refresh: u64,
    pub load_mode: u64,
    pub burst_stop: u64,
    pub nop: u64,
    pub deselect: u64,
}

impl CommandCounts {
    fn count(&mut self, command: Command) {
        let slot = match command {
            Command::Active => &mut self.activate,
            Command::Read => &mut self.read,
            Command::Write => &mut self.write,
            Command::Precharge => &mut self.precharge,
            Command::PrechargeAll => &mut self.precharge_all,
            Command::AutoRefresh => &mut self.auto_refresh,
            Command::LoadModeRegister => &mut self.load_mode,
            Command::BurstStop => &mut self.burst_stop,
            Command::Nop => &mut self.nop,
            Command::Deselect => &mut self.deselect,
        };
        *slot += 1;
    }
}

/// Simulation statistics structure tracking all performance metrics.
#[derive(Clone, Debug, Serialize)]
pub struct SimStats {
    #[serde(skip)]
    start_time: Instant,
    pub cycles: u64,
    /// First cycle with `ready` high.
    pub ready_at: Option<u64>,
    pub ready_cycles: u64,

    pub commands: CommandCounts,

    pub words_read: u64,
    pub words_written: u64,

    pub refresh_max_gap: u64,
    #[serde(skip)]
    last_refresh: Option<u64>,

    pub bus_controller_cycles: u64,
    pub bus_device_cycles: u64,
    pub bus_idle_cycles: u64,
    pub contention_cycles: u64,
}

impl Default for SimStats {
    /// Returns the default value.
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
            cycles: 0,
            ready_at: None,
            ready_cycles: 0,
            commands: CommandCounts::default(),
            words_read: 0,
            words_written: 0,
            refresh_max_gap: 0,
            last_refresh: None,
            bus_controller_cycles: 0,
            bus_device_cycles: 0,
            bus_idle_cycles: 0,
            contention_cycles: 0,
        }
    }
}

impl SimStats {
    /// Accounts for one cycle of wire levels.
    pub fn record(&mut self, rec: &CycleRecord) {
        self.cycles += 1;
        self.commands.count(rec.command);

        if rec.ready {
            self.ready_cycles += 1;
            if self.ready_at.is_none() {
                self.ready_at = Some(rec.cycle);
            }
        }
        if rec.rd_inc_address {
            self.words_read += 1;
        }
        if rec.wr_inc_address {
            self.words_written += 1;
        }

        if rec.command == Command::AutoRefresh {
            if let Some(last) = self.last_refresh {
                self.refresh_max_gap = self.refresh_max_gap.max(rec.cycle - last);
            }
            self.last_refresh = Some(rec.cycle);
        }

        match rec.driver {
            BusDriver::Controller => self.bus_controller_cycles += 1,
            BusDriver::Device => self.bus_device_cycles += 1,
            BusDriver::Nobody => self.bus_idle_cycles += 1,
        }
        if rec.contention {
            self.contention_cycles += 1;
        }
    }

    /// Read bursts started (one READ command per burst).
    pub fn read_bursts(&self) -> u64 {
        self.commands.read
    }

    /// Write bursts started.
    pub fn write_bursts(&self) -> u64 {
        self.commands.write
    }

    /// Serializes the counters as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Prints a formatted summary of all simulation statistics.
    ///
    /// Displays command counts, data traffic, refresh spacing and bus
    /// utilization in a human-readable format.
    pub fn print(&self) {
        let duration = self.start_time.elapsed();
        let seconds = duration.as_secs_f64().max(f64::EPSILON);
        let cyc = if self.cycles == 0 { 1 } else { self.cycles };
        let khz = (self.cycles as f64 / seconds) / 1000.0;
        let pct = |n: u64| (n as f64 / cyc as f64) * 100.0;

        println!("\n==========================================================");
        println!("SDRAM CONTROLLER SIMULATION STATISTICS");
        println!("==========================================================");
        println!("host_seconds             {:.4} s", seconds);
        println!("sim_cycles               {}", self.cycles);
        println!("sim_freq                 {:.2} kHz", khz);
        match self.ready_at {
            Some(c) => println!("ready_at                 {}", c),
            None => println!("ready_at                 never"),
        }
        println!(
            "ready                    {} ({:.2}%)",
            self.ready_cycles,
            pct(self.ready_cycles)
        );
        println!("----------------------------------------------------------");
        println!("COMMANDS");
        println!("  active                 {}", self.commands.activate);
        println!("  read                   {}", self.commands.read);
        println!("  write                  {}", self.commands.write);
        println!("  precharge              {}", self.commands.precharge);
        println!("  precharge_all          {}", self.commands.precharge_all);
        println!("  auto_refresh           {}", self.commands.auto_refresh);
        println!("  load_mode              {}", self.commands.load_mode);
        println!("  burst_stop             {}", self.commands.burst_stop);
        println!("  nop                    {}", self.commands.nop);
        println!("  deselect               {}", self.commands.deselect);
        println!("----------------------------------------------------------");
        println!("TRAFFIC");
        println!("  words.read             {}", self.words_read);
        println!("  words.written          {}", self.words_written);
        println!("  refresh.max_gap        {} cycles", self.refresh_max_gap);
        println!("----------------------------------------------------------");
        println!("DATA BUS");
        println!(
            "  driver.controller      {} ({:.2}%)",
            self.bus_controller_cycles,
            pct(self.bus_controller_cycles)
        );
        println!(
            "  driver.device          {} ({:.2}%)",
            self.bus_device_cycles,
            pct(self.bus_device_cycles)
        );
        println!(
            "  driver.none            {} ({:.2}%)",
            self.bus_idle_cycles,
            pct(self.bus_idle_cycles)
        );
        println!("  contention             {}", self.contention_cycles);
        println!("==========================================================");
    }
}
