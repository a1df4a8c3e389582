//! Factory for averaging engines.
//!
//! `RunContext` holds a [`RunOptions`] and builds the engine for the selected
//! [`Strategy`], wiring in a shared [`Interrupt`] so a run can be aborted
//! from another thread.
//!
//! # Usage
//!
//! 1. Construct a `RunContext` from `RunOptions`.
//! 2. Optionally hand `interrupt()` to whoever may need to abort the run.
//! 3. Call `run` with the `next` and `current` buffers (length `n + 2`).

use crate::config::{RunOptions, Strategy};
use crate::core::traits::AveragingEngine;
use crate::engine::{BarrierEngine, FuzzyEngine, Sequential};
use crate::error::StencilError;
use crate::parallel::Interrupt;
use crate::utils::stats::RunStats;

#[derive(Debug, Clone)]
pub struct RunContext {
    pub options: RunOptions,
    interrupt: Interrupt,
}

impl RunContext {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            interrupt: Interrupt::new(),
        }
    }

    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Handle that aborts current and future runs of this context.
    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Builds the engine for `options.strategy`.
    pub fn engine(&self) -> Box<dyn AveragingEngine + Send> {
        let RunOptions { iterations, tasks, remainder, .. } = self.options;
        let interrupt = self.interrupt.clone();
        match self.options.strategy {
            Strategy::Sequential => Box::new(Sequential::new(iterations).with_interrupt(interrupt)),
            Strategy::Barrier => Box::new(
                BarrierEngine::new(iterations, tasks)
                    .with_remainder(remainder)
                    .with_interrupt(interrupt),
            ),
            Strategy::Fuzzy => Box::new(
                FuzzyEngine::new(iterations, tasks)
                    .with_remainder(remainder)
                    .with_interrupt(interrupt),
            ),
        }
    }

    /// Validates the options, then runs the selected engine over both buffers.
    pub fn run(&self, next: &mut [f64], current: &mut [f64]) -> Result<RunStats, StencilError> {
        self.options.validate()?;
        self.engine().run(next, current, self.options.n)
    }
}
