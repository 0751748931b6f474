//! VCD Waveform Output.
//!
//! Dumps the controller pins, the resolved data line and the requester
//! handshake once per cycle so a run can be inspected in a waveform viewer.
//! Each cycle spans two timestamps: clock high, then clock low.

use std::cell::RefCell;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use crate::common::error::SimError;
use crate::soc::builder::CycleRecord;
use crate::soc::mux::LineState;
use crate::soc::traits::CycleObserver;

trait Bits {
    fn bits(&self, width: u32) -> Box<[vcd::Value]>;
}

impl Bits for u32 {
    fn bits(&self, width: u32) -> Box<[vcd::Value]> {
        (0..width)
            .rev()
            .map(|i| {
                if (self >> i) & 1 == 1 {
                    vcd::Value::V1
                } else {
                    vcd::Value::V0
                }
            })
            .collect()
    }
}

impl Bits for LineState {
    fn bits(&self, width: u32) -> Box<[vcd::Value]> {
        match self {
            LineState::Driven(v) => v.bits(width),
            LineState::HighZ => vec![vcd::Value::Z; width as usize].into(),
        }
    }
}

struct Ids {
    clk: vcd::IdCode,
    command: vcd::IdCode,
    state: vcd::IdCode,
    cke: vcd::IdCode,
    cs_n: vcd::IdCode,
    ras_n: vcd::IdCode,
    cas_n: vcd::IdCode,
    we_n: vcd::IdCode,
    ba: vcd::IdCode,
    a: vcd::IdCode,
    dqm: vcd::IdCode,
    dq: vcd::IdCode,
    dq_we: vcd::IdCode,
    ready: vcd::IdCode,
    rd_inc: vcd::IdCode,
    wr_inc: vcd::IdCode,
    rd_data: vcd::IdCode,
    wr_data: vcd::IdCode,
}

/// Output shared between the VCD writer and the trace, which flushes it.
struct Sink<W>(Rc<RefCell<W>>);

impl<W: Write> Write for Sink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.borrow_mut().flush()
    }
}

/// Writes one VCD file for a simulation run.
pub struct VcdTrace<W: Write> {
    /// `None` once the trace is finished.
    w: Option<vcd::Writer<Sink<W>>>,
    out: Rc<RefCell<W>>,
    ids: Ids,
}

impl VcdTrace<BufWriter<fs::File>> {
    /// Creates `path` and writes the VCD header.
    ///
    /// # Arguments
    ///
    /// * `path` - Output file
    /// * `clock_hz` - Controller clock, sets the timescale
    pub fn create(path: impl AsRef<Path>, clock_hz: u64) -> io::Result<Self> {
        let file = fs::File::create(path)?;
        Self::new(BufWriter::new(file), clock_hz)
    }
}

impl<W: Write> VcdTrace<W> {
    /// Writes the VCD header to `out`.
    pub fn new(out: W, clock_hz: u64) -> io::Result<Self> {
        let out = Rc::new(RefCell::new(out));
        let mut w = vcd::Writer::new(Sink(Rc::clone(&out)));
        let half_period_ps = (1e12 / clock_hz.max(1) as f64 / 2.0)
            .round()
            .max(1.0) as u32;
        w.timescale(half_period_ps, vcd::TimescaleUnit::PS)?;

        w.add_module("sdram_top")?;
        let ids = Ids {
            clk: w.add_wire(1, "clk")?,
            command: w.add_var(vcd::VarType::String, 4, "command", None)?,
            state: w.add_wire(3, "state")?,
            cke: w.add_wire(1, "cke")?,
            cs_n: w.add_wire(1, "cs_n")?,
            ras_n: w.add_wire(1, "ras_n")?,
            cas_n: w.add_wire(1, "cas_n")?,
            we_n: w.add_wire(1, "we_n")?,
            ba: w.add_wire(2, "ba")?,
            a: w.add_wire(11, "a")?,
            dqm: w.add_wire(4, "dqm")?,
            dq: w.add_wire(32, "dq")?,
            dq_we: w.add_wire(1, "dq_write_enable")?,
            ready: w.add_wire(1, "ready")?,
            rd_inc: w.add_wire(1, "rd_inc_address")?,
            wr_inc: w.add_wire(1, "wr_inc_address")?,
            rd_data: w.add_wire(32, "rd_data_out")?,
            wr_data: w.add_wire(32, "wr_data_in")?,
        };
        w.upscope()?;
        w.enddefinitions()?;
        w.timestamp(0)?;

        Ok(Self {
            w: Some(w),
            out,
            ids,
        })
    }

    fn write_cycle(&mut self, rec: &CycleRecord) -> io::Result<()> {
        let Some(w) = self.w.as_mut() else {
            return Ok(());
        };
        let strobes = rec.command.strobes();
        let ids = &self.ids;

        w.timestamp(rec.cycle * 2)?;
        w.change_scalar(ids.clk, true)?;
        w.change_string(ids.command, rec.command.mnemonic())?;
        w.change_vector(ids.state, &(rec.state.code() as u32).bits(3))?;
        w.change_scalar(ids.cke, rec.cke)?;
        w.change_scalar(ids.cs_n, strobes.cs_n)?;
        w.change_scalar(ids.ras_n, strobes.ras_n)?;
        w.change_scalar(ids.cas_n, strobes.cas_n)?;
        w.change_scalar(ids.we_n, strobes.we_n)?;
        w.change_vector(ids.ba, &(rec.bank as u32).bits(2))?;
        w.change_vector(ids.a, &(rec.address as u32).bits(11))?;
        w.change_vector(ids.dqm, &(rec.dqm as u32).bits(4))?;
        w.change_vector(ids.dq, &rec.line.bits(32))?;
        w.change_scalar(ids.dq_we, rec.dq_write_enable)?;
        w.change_scalar(ids.ready, rec.ready)?;
        w.change_scalar(ids.rd_inc, rec.rd_inc_address)?;
        w.change_scalar(ids.wr_inc, rec.wr_inc_address)?;
        w.change_vector(ids.rd_data, &rec.rd_data_out.bits(32))?;
        w.change_vector(ids.wr_data, &rec.wr_data_in.bits(32))?;

        w.timestamp(rec.cycle * 2 + 1)?;
        w.change_scalar(ids.clk, false)?;
        Ok(())
    }
}

impl<W: Write> CycleObserver for VcdTrace<W> {
    fn record(&mut self, record: &CycleRecord) -> Result<(), SimError> {
        Ok(self.write_cycle(record)?)
    }

    fn finish(&mut self) -> Result<(), SimError> {
        if self.w.take().is_some() {
            self.out.borrow_mut().flush()?;
        }
        Ok(())
    }
}
