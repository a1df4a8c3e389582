//! Run bookkeeping: which buffer holds the result, and run statistics.

use std::time::Duration;

use crate::config::Strategy;

/// Names the caller buffer that holds the state written by the last iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalBuffer {
    Current,
    Next,
}

impl FinalBuffer {
    /// Even iteration counts end in `current`, odd counts in `next`.
    pub fn after(iterations: usize) -> Self {
        if iterations % 2 == 0 {
            FinalBuffer::Current
        } else {
            FinalBuffer::Next
        }
    }

    pub fn select<'a>(self, next: &'a [f64], current: &'a [f64]) -> &'a [f64] {
        match self {
            FinalBuffer::Current => current,
            FinalBuffer::Next => next,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RunStats {
    pub strategy: Strategy,
    pub iterations: usize,
    /// 1 for the sequential strategy
    pub tasks: usize,
    pub final_buffer: FinalBuffer,
    pub elapsed: Duration,
    /// Largest phase difference seen between adjacent workers at a sync point.
    /// Always 0 for the sequential and global-barrier strategies.
    pub max_neighbor_skew: u64,
}
