//! Parallel engine synchronized by one global barrier per iteration.
//!
//! Every worker relaxes its chunk, then waits at a shared [`GroupBarrier`]
//! until all workers are done before swapping buffer roles. The barrier
//! release orders every write of iteration `t` before every read of
//! iteration `t + 1`, at the cost of the slowest worker pacing the group.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{RemainderPolicy, Strategy};
use crate::core::arena::{BufferArena, check_buffers};
use crate::core::traits::AveragingEngine;
use crate::engine::check_interrupt;
use crate::engine::worker::{relax, run_workers};
use crate::error::StencilError;
use crate::parallel::{GroupBarrier, Interrupt};
use crate::utils::partition::partition;
use crate::utils::stats::{FinalBuffer, RunStats};

pub struct BarrierEngine {
    pub iterations: usize,
    pub tasks: usize,
    pub remainder: RemainderPolicy,
    interrupt: Option<Interrupt>,
}

impl BarrierEngine {
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

impl AveragingEngine for BarrierEngine {
    fn strategy(&self) -> Strategy {
        Strategy::Barrier
    }

    fn run(&mut self, next: &mut [f64], current: &mut [f64], n: usize) -> Result<RunStats, StencilError> {
        check_buffers(next, current, n)?;
        let chunks = partition(n, self.tasks, self.remainder)?;
        check_interrupt(self.interrupt.as_ref())?;
        let iterations = self.iterations;
        tracing::debug!(strategy = "barrier", n, tasks = chunks.len(), iterations, "run started");
        let start = Instant::now();

        let arena = BufferArena::load(next, current);
        let barrier = Arc::new(GroupBarrier::new());
        barrier.register(chunks.len());
        if let Some(interrupt) = &self.interrupt {
            interrupt.attach(&barrier);
        }

        run_workers(Strategy::Barrier, &chunks, &*barrier, |chunk| {
            let (mut dst, mut src) = arena.pair();
            for _ in 0..iterations {
                relax(src, dst, chunk);
                barrier.arrive_and_await_advance()?;
                std::mem::swap(&mut src, &mut dst);
            }
            tracing::trace!(worker = chunk.worker, "worker done");
            Ok(())
        })?;

        arena.store_into(next, current);
        let elapsed = start.elapsed();
        tracing::debug!(strategy = "barrier", ?elapsed, phase = barrier.phase(), "run finished");
        Ok(RunStats {
            strategy: Strategy::Barrier,
            iterations,
            tasks: chunks.len(),
            final_buffer: FinalBuffer::after(iterations),
            elapsed,
            max_neighbor_skew: 0,
        })
    }
}

/// Runs `iterations` sweeps on `tasks` workers that all meet at one barrier
/// after every sweep. `n` must be a multiple of `tasks`.
pub fn run_parallel_barrier(
    iterations: usize,
    next: &mut [f64],
    current: &mut [f64],
    n: usize,
    tasks: usize,
) -> Result<FinalBuffer, StencilError> {
    BarrierEngine::new(iterations, tasks)
        .run(next, current, n)
        .map(|stats| stats.final_buffer)
}
