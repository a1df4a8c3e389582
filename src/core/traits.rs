//! Core engine trait for stencil1d.

use crate::config::Strategy;
use crate::error::StencilError;
use crate::utils::stats::RunStats;

/// Common interface for every averaging strategy.
pub trait AveragingEngine {
    fn strategy(&self) -> Strategy;

    /// Runs the configured number of sweeps over `[1..n]`, mutating both
    /// buffers in place. `RunStats::final_buffer` names the slice holding
    /// the result. Sentinels at `0` and `n + 1` are never written.
    fn run(&mut self, next: &mut [f64], current: &mut [f64], n: usize) -> Result<RunStats, StencilError>;
}
