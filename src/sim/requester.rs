//! Page Requester Model.
//!
//! Drives the controller's requester interface the way a client circuit
//! would: it pulses `start_read`/`start_write` while `ready` is high, keeps
//! the current write word on `wr_data_in` and moves to the next one after
//! every `wr_inc_address`, and collects `rd_data_out` on every
//! `rd_inc_address`.

use std::collections::VecDeque;

use tracing::debug;

use crate::common::PageAddress;
use crate::core::signals::{RequestSignals, RequesterOutputs};

/// One page transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Job {
    /// Writes `words` starting at `address`. The length must match the burst
    /// the controller runs from that address.
    Write { address: PageAddress, words: Vec<u32> },

    /// Reads `words` words starting at `address`.
    Read { address: PageAddress, words: usize },
}

/// A finished job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    Written {
        address: PageAddress,
        words: usize,
        started_at: u64,
        finished_at: u64,
    },
    Read {
        address: PageAddress,
        data: Vec<u32>,
        started_at: u64,
        finished_at: u64,
    },
}

impl Completion {
    pub fn address(&self) -> PageAddress {
        match self {
            Completion::Written { address, .. } | Completion::Read { address, .. } => *address,
        }
    }

    /// Cycles from the start pulse to the last data word.
    pub fn latency(&self) -> u64 {
        match self {
            Completion::Written {
                started_at,
                finished_at,
                ..
            }
            | Completion::Read {
                started_at,
                finished_at,
                ..
            } => finished_at - started_at,
        }
    }
}

#[derive(Clone, Debug)]
struct Scheduled {
    job: Job,
    not_before: u64,
}

#[derive(Clone, Debug)]
struct InFlight {
    job: Job,
    started_at: u64,
    index: usize,
    data: Vec<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct PageRequester {
    queue: VecDeque<Scheduled>,
    in_flight: Option<InFlight>,
    completions: Vec<Completion>,
}

impl PageRequester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a job to start as soon as the controller is ready.
    pub fn push(&mut self, job: Job) {
        self.push_at(job, 0);
    }

    /// Queues a job that will not start before `cycle`.
    pub fn push_at(&mut self, job: Job, cycle: u64) {
        self.queue.push_back(Scheduled {
            job,
            not_before: cycle,
        });
    }

    /// True when no job is queued or in flight.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.in_flight.is_none()
    }

    pub fn completions(&self) -> &[Completion] {
        &self.completions
    }

    pub fn take_completions(&mut self) -> Vec<Completion> {
        std::mem::take(&mut self.completions)
    }

    /// Produces the inputs for the current cycle and reacts to the
    /// controller outputs of the same cycle, as at the closing edge.
    ///
    /// # Arguments
    ///
    /// * `outputs` - Controller outputs during the current cycle
    /// * `cycle` - Index of the current cycle
    ///
    /// # Returns
    ///
    /// Requester inputs to hold during the current cycle.
    pub fn step(&mut self, outputs: &RequesterOutputs, cycle: u64) -> RequestSignals {
        let mut signals = RequestSignals::default();

        match self.in_flight.as_ref() {
            Some(flight) => {
                if let Job::Write { words, .. } = &flight.job {
                    signals.wr_data_in = words.get(flight.index).copied().unwrap_or(0);
                }
            }
            None => {
                if outputs.ready {
                    self.start_next(&mut signals, cycle);
                }
                return signals;
            }
        }

        let finished = match self.in_flight.as_mut() {
            Some(flight) => match &flight.job {
                Job::Write { words, .. } => {
                    if outputs.wr_inc_address {
                        flight.index += 1;
                    }
                    flight.index >= words.len()
                }
                Job::Read { words, .. } => {
                    if outputs.rd_inc_address {
                        flight.data.push(outputs.rd_data_out);
                    }
                    flight.data.len() >= *words
                }
            },
            None => false,
        };
        if finished {
            self.complete(cycle);
        }
        signals
    }

    fn start_next(&mut self, signals: &mut RequestSignals, cycle: u64) {
        let ready = matches!(self.queue.front(), Some(s) if s.not_before <= cycle);
        if !ready {
            return;
        }
        let Some(Scheduled { job, .. }) = self.queue.pop_front() else {
            return;
        };
        match &job {
            Job::Write { address, words } => {
                let first = words.first().copied().unwrap_or(0);
                *signals = RequestSignals::write(address.val(), first);
            }
            Job::Read { address, .. } => {
                *signals = RequestSignals::read(address.val());
            }
        }
        debug!(cycle, ?job, "requester start");
        self.in_flight = Some(InFlight {
            job,
            started_at: cycle,
            index: 0,
            data: Vec::new(),
        });
    }

    fn complete(&mut self, cycle: u64) {
        let Some(flight) = self.in_flight.take() else {
            return;
        };
        let completion = match flight.job {
            Job::Write { address, words } => Completion::Written {
                address,
                words: words.len(),
                started_at: flight.started_at,
                finished_at: cycle,
            },
            Job::Read { address, .. } => Completion::Read {
                address,
                data: flight.data,
                started_at: flight.started_at,
                finished_at: cycle,
            },
        };
        debug!(cycle, address = %completion.address(), "requester done");
        self.completions.push(completion);
    }
}
