//! Pipelined parallel engine with a fuzzy barrier.
//!
//! Instead of one barrier for the whole group, worker `i` owns a
//! [`PhaseCounter`](crate::parallel::PhaseCounter). After relaxing its chunk
//! for phase `p` it arrives on its own counter and waits until its left and
//! right neighbours have both completed `p`. Those are the only workers
//! whose chunks border its own, so they own every value it reads next:
//!
//! ```text
//!   worker i-1         worker i          worker i+1
//! [ .. left_i - 1 ] [ left_i .. right_i ] [ right_i + 1 .. ]
//!              ^ read by i          read by i ^
//! ```
//!
//! The wait also orders the neighbour's reads of phase `p` before this
//! worker's writes of phase `p + 1` into the same buffer. Adjacent workers
//! never drift more than one phase apart; workers further apart may.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{RemainderPolicy, Strategy};
use crate::core::arena::{BufferArena, check_buffers};
use crate::core::traits::AveragingEngine;
use crate::engine::check_interrupt;
use crate::engine::worker::{relax, run_workers};
use crate::error::StencilError;
use crate::parallel::{Interrupt, NeighborSync};
use crate::utils::partition::partition;
use crate::utils::stats::{FinalBuffer, RunStats};

pub struct FuzzyEngine {
    pub iterations: usize,
    pub tasks: usize,
    pub remainder: RemainderPolicy,
    interrupt: Option<Interrupt>,
}

impl FuzzyEngine {
    pub fn new(iterations: usize, tasks: usize) -> Self {
        Self {
            iterations,
            tasks,
            remainder: RemainderPolicy::Reject,
            interrupt: None,
        }
    }

    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = Some(interrupt);
        self
    }
}

impl AveragingEngine for FuzzyEngine {
    fn strategy(&self) -> Strategy {
        Strategy::Fuzzy
    }

    fn run(&mut self, next: &mut [f64], current: &mut [f64], n: usize) -> Result<RunStats, StencilError> {
        check_buffers(next, current, n)?;
        let chunks = partition(n, self.tasks, self.remainder)?;
        check_interrupt(self.interrupt.as_ref())?;
        let iterations = self.iterations;
        tracing::debug!(strategy = "fuzzy", n, tasks = chunks.len(), iterations, "run started");
        let start = Instant::now();

        let arena = BufferArena::load(next, current);
        let sync = Arc::new(NeighborSync::new(chunks.len()));
        if let Some(interrupt) = &self.interrupt {
            interrupt.attach(&sync);
        }

        let skews = run_workers(Strategy::Fuzzy, &chunks, &*sync, |chunk| {
            let (mut dst, mut src) = arena.pair();
            let mut worst = 0;
            for _ in 0..iterations {
                relax(src, dst, chunk);
                let point = sync.arrive_and_await_neighbors(chunk.worker)?;
                worst = worst.max(point.skew);
                std::mem::swap(&mut src, &mut dst);
            }
            tracing::trace!(worker = chunk.worker, max_skew = worst, "worker done");
            Ok(worst)
        })?;

        arena.store_into(next, current);
        let elapsed = start.elapsed();
        let max_neighbor_skew = skews.into_iter().max().unwrap_or(0);
        tracing::debug!(strategy = "fuzzy", ?elapsed, max_neighbor_skew, "run finished");
        Ok(RunStats {
            strategy: Strategy::Fuzzy,
            iterations,
            tasks: chunks.len(),
            final_buffer: FinalBuffer::after(iterations),
            elapsed,
            max_neighbor_skew,
        })
    }
}

/// Runs `iterations` sweeps on `tasks` workers, each synchronizing only with
/// its immediate neighbours. `n` must be a multiple of `tasks`.
pub fn run_parallel_fuzzy_barrier(
    iterations: usize,
    next: &mut [f64],
    current: &mut [f64],
    n: usize,
    tasks: usize,
) -> Result<FinalBuffer, StencilError> {
    FuzzyEngine::new(iterations, tasks)
        .run(next, current, n)
        .map(|stats| stats.final_buffer)
}
