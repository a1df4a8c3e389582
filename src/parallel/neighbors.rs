//! Fuzzy-barrier protocol: each worker waits only on its immediate neighbours.

use super::{Cancel, PhaseCounter};
use crate::error::StencilError;

/// Which adjacent workers exist for a worker in a row of `tasks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    pub left: Option<usize>,
    pub right: Option<usize>,
}

impl Neighbors {
    /// Worker 0 has no left neighbour and worker `tasks - 1` no right one;
    /// their outer reads hit the fixed sentinels.
    pub fn of(worker: usize, tasks: usize) -> Self {
        Self {
            left: worker.checked_sub(1),
            right: (worker + 1 < tasks).then_some(worker + 1),
        }
    }

    /// Left first, then right.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        self.left.into_iter().chain(self.right)
    }
}

/// Outcome of one neighbour synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPoint {
    /// Phase number the caller just completed
    pub completed: u64,
    /// Largest difference between the caller's and a neighbour's arrival
    /// count, sampled before waiting on that neighbour
    pub skew: u64,
}

/// One [`PhaseCounter`] per worker, indexed by worker id.
#[derive(Debug)]
pub struct NeighborSync {
    counters: Vec<PhaseCounter>,
}

impl NeighborSync {
    pub fn new(tasks: usize) -> Self {
        Self {
            counters: (0..tasks).map(|_| PhaseCounter::new()).collect(),
        }
    }

    pub fn tasks(&self) -> usize {
        self.counters.len()
    }

    pub fn counter(&self, worker: usize) -> &PhaseCounter {
        &self.counters[worker]
    }

    /// Snapshot of every worker's arrival count.
    pub fn phases(&self) -> Vec<u64> {
        self.counters.iter().map(PhaseCounter::phase).collect()
    }

    /// Arrives on `worker`'s own counter, then waits until each existing
    /// neighbour has completed the same phase. Fails with `Cancelled` once
    /// the group has been cancelled.
    pub fn arrive_and_await_neighbors(&self, worker: usize) -> Result<SyncPoint, StencilError> {
        let own_counter = &self.counters[worker];
        let completed = own_counter.arrive();
        // Edge workers may have nobody to wait on; they still stop here.
        if own_counter.is_cancelled() {
            return Err(StencilError::Cancelled);
        }
        let own = completed + 1;
        let mut skew = 0;
        for peer in Neighbors::of(worker, self.tasks()).iter() {
            let counter = &self.counters[peer];
            skew = skew.max(counter.phase().abs_diff(own));
            counter.await_advance(completed)?;
        }
        Ok(SyncPoint { completed, skew })
    }
}

impl Cancel for NeighborSync {
    fn cancel(&self) {
        for counter in &self.counters {
            counter.cancel();
        }
    }

    fn is_cancelled(&self) -> bool {
        self.counters.iter().any(PhaseCounter::is_cancelled)
    }
}
