//! Command-line or API options for averaging runs.
//!
//! This module provides the `RunOptions` struct, which is used to specify
//! the problem size, iteration count, worker count and execution strategy
//! of a run via command-line arguments or API calls. The available
//! strategies are sequential, global barrier and fuzzy barrier. The
//! remainder policy decides what happens when `n` does not split evenly
//! across the workers.

use std::fmt;
use std::str::FromStr;

use crate::error::StencilError;

/// Execution strategy for an averaging run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Single-threaded reference computation
    Sequential,
    /// All workers rendezvous at one shared barrier every iteration
    Barrier,
    /// Each worker only waits on its immediate neighbours' phase counters
    #[default]
    Fuzzy,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Sequential, Strategy::Barrier, Strategy::Fuzzy];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Barrier => "barrier",
            Strategy::Fuzzy => "fuzzy",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = StencilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(Strategy::Sequential),
            "barrier" | "global" => Ok(Strategy::Barrier),
            "fuzzy" | "fuzzy-barrier" | "phaser" => Ok(Strategy::Fuzzy),
            _ => Err(StencilError::UnknownStrategy(s.to_string())),
        }
    }
}

/// How indices left over by `n / tasks` are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemainderPolicy {
    /// `n` must be a multiple of `tasks`
    #[default]
    Reject,
    /// The first `n % tasks` workers own one extra index each
    Spread,
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainderPolicy::Reject => f.write_str("reject"),
            RemainderPolicy::Spread => f.write_str("spread"),
        }
    }
}

impl FromStr for RemainderPolicy {
    type Err = StencilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(RemainderPolicy::Reject),
            "spread" => Ok(RemainderPolicy::Spread),
            _ => Err(StencilError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Run parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Number of averaging sweeps
    pub iterations: usize,

    /// Number of interior points; buffers hold `n + 2` values
    pub n: usize,

    /// Number of worker threads (ignored by the sequential strategy)
    pub tasks: usize,

    /// Execution strategy
    pub strategy: Strategy,

    /// Handling of `n % tasks != 0`
    pub remainder: RemainderPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            iterations: 64,
            // lcm(1..=16): splits evenly for any task count up to 16
            n: 720_720,
            tasks: num_cpus::get(),
            strategy: Strategy::default(),
            remainder: RemainderPolicy::default(),
        }
    }
}

impl RunOptions {
    pub fn new(iterations: usize, n: usize, tasks: usize, strategy: Strategy) -> Self {
        Self {
            iterations,
            n,
            tasks,
            strategy,
            remainder: RemainderPolicy::Reject,
        }
    }

    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    /// Buffer length every run with these options expects.
    pub fn buffer_len(&self) -> usize {
        self.n + 2
    }

    /// Checks the problem shape without touching any buffer.
    ///
    /// The sequential strategy has no workers, so only `n` is checked for it.
    pub fn validate(&self) -> Result<(), StencilError> {
        if self.n == 0 {
            return Err(StencilError::EmptyDomain);
        }
        if self.strategy == Strategy::Sequential {
            return Ok(());
        }
        crate::utils::partition::check_shape(self.n, self.tasks, self.remainder)
    }
}
