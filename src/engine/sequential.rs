//! Single-threaded reference engine.

use std::time::Instant;

use crate::config::Strategy;
use crate::core::arena::check_buffers;
use crate::core::traits::AveragingEngine;
use crate::engine::check_interrupt;
use crate::error::StencilError;
use crate::parallel::Interrupt;
use crate::utils::stats::{FinalBuffer, RunStats};

pub struct Sequential {
    pub iterations: usize,
    interrupt: Option<Interrupt>,
}

impl Sequential {
    pub fn new(iterations: usize) -> Self {
        Self { iterations, interrupt: None }
    }

    /// The interrupt is checked once, before the first sweep; the sequential
    /// engine never blocks.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }
}

impl AveragingEngine for Sequential {
    fn strategy(&self) -> Strategy {
        Strategy::Sequential
    }

    fn run(&mut self, next: &mut [f64], current: &mut [f64], n: usize) -> Result<RunStats, StencilError> {
        check_buffers(next, current, n)?;
        check_interrupt(self.interrupt.as_ref())?;
        let start = Instant::now();

        let mut src: &mut [f64] = current;
        let mut dst: &mut [f64] = next;
        for _ in 0..self.iterations {
            for j in 1..=n {
                dst[j] = (src[j - 1] + src[j + 1]) / 2.0;
            }
            std::mem::swap(&mut src, &mut dst);
        }

        let elapsed = start.elapsed();
        tracing::debug!(strategy = "sequential", n, iterations = self.iterations, ?elapsed, "run finished");
        Ok(RunStats {
            strategy: Strategy::Sequential,
            iterations: self.iterations,
            tasks: 1,
            final_buffer: FinalBuffer::after(self.iterations),
            elapsed,
            max_neighbor_skew: 0,
        })
    }
}

/// Runs `iterations` sweeps on the calling thread.
pub fn run_sequential(
    iterations: usize,
    next: &mut [f64],
    current: &mut [f64],
    n: usize,
) -> Result<FinalBuffer, StencilError> {
    Sequential::new(iterations).run(next, current, n).map(|stats| stats.final_buffer)
}
