//! SDRAM Controller Simulator CLI.
//!
//! Builds the controller, bus mux and SDRAM device from a configuration
//! file and runs one of the canned scenarios. It supports:
//! 1. Optional VCD waveform output of every cycle.
//! 2. Statistics printed at the end and optionally exported as JSON.
//! 3. Per-command tracing through `tracing` (`--trace` or `RUST_LOG`).

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sdram_controller::config::Config;
use sdram_controller::sim::scenario::DEFAULT_SCENARIO_CYCLES;
use sdram_controller::sim::{Completion, Scenario, ScenarioKind, VcdTrace};
use sdram_controller::soc::Top;

#[derive(Parser, Debug)]
#[command(author, version, about = "Cycle-accurate SDRAM controller simulator")]
struct Args {
    /// TOML configuration; datasheet defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario to run.
    #[arg(short, long, value_enum, default_value = "round-trip")]
    simulate: ScenarioKind,

    /// Cycles to run after the controller becomes ready.
    #[arg(long, default_value_t = DEFAULT_SCENARIO_CYCLES)]
    cycles: u64,

    /// Write a VCD waveform of the run.
    #[arg(long)]
    vcd: Option<PathBuf>,

    /// Export statistics as JSON.
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Log every command put on the pins.
    #[arg(long)]
    trace: bool,
}

fn init_logging(trace: bool) {
    let default = if trace || cfg!(feature = "always-trace") {
        "trace"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn print_config(config: &Config) -> Result<()> {
    let timing = config.cycle_timing()?;
    println!("==========================================================");
    println!("Global Configuration");
    println!("==========================================================");
    println!("clock                    {} Hz", config.clock.frequency_hz);
    println!("data_byte_width          {}", config.interface.data_byte_width);
    println!("burst_length             {:?}", config.interface.burst_length);
    println!("cas_latency              {}", timing.cas_latency);
    println!(
        "cycles                   power_up={} rc={} rcd={} rp={} rrd={} ras={} wr={} mrd={} \
         refi={}",
        timing.power_up,
        timing.rc,
        timing.rcd,
        timing.rp,
        timing.rrd,
        timing.ras,
        timing.wr,
        timing.mrd,
        timing.refi
    );
    println!("init_cycles              {}", timing.init_cycles());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => Config::default(),
    };
    if args.trace {
        config.general.trace_commands = true;
    }
    init_logging(config.general.trace_commands);
    print_config(&config)?;

    let mut top = Top::new(&config).context("building the controller")?;
    if let Some(path) = &args.vcd {
        let trace = VcdTrace::create(path, config.clock.frequency_hz)
            .with_context(|| format!("creating {}", path.display()))?;
        top.attach(Box::new(trace));
        println!("[*] Writing trace to {}", path.display());
    }

    let scenario = Scenario::new(args.simulate, args.cycles);
    let report = match scenario.run(&mut top) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("\n[!] FATAL: {}", e);
            top.stats().print();
            process::exit(1);
        }
    };

    println!("\n[*] Scenario {:?}: ready at cycle {}", report.kind, report.ready_at);
    for completion in &report.completions {
        match completion {
            Completion::Written { address, words, .. } => {
                println!(
                    "    wrote {:>3} words at {} in {} cycles",
                    words,
                    address,
                    completion.latency()
                )
            }
            Completion::Read { address, data, .. } => {
                println!(
                    "    read  {:>3} words at {} in {} cycles",
                    data.len(),
                    address,
                    completion.latency()
                )
            }
        }
    }
    for m in &report.mismatches {
        println!(
            "    mismatch at {:#08x}: expected {:#010x}, got {:#010x}",
            m.address, m.expected, m.actual
        );
    }

    top.stats().print();
    if let Some(path) = &args.stats_json {
        let json = top.stats().to_json().context("serializing statistics")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    if !report.passed() {
        eprintln!("\n[!] {} data mismatch(es)", report.mismatches.len());
        process::exit(2);
    }
    Ok(())
}
