//! Static partitioning of the interior domain `[1..n]` into worker chunks.

use std::ops::RangeInclusive;

use crate::config::RemainderPolicy;
use crate::error::StencilError;

/// A contiguous range of interior indices written by exactly one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub worker: usize,
    pub left: usize,
    pub right: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.right + 1 - self.left
    }

    pub fn is_empty(&self) -> bool {
        self.right < self.left
    }

    pub fn contains(&self, j: usize) -> bool {
        self.left <= j && j <= self.right
    }

    pub fn range(&self) -> RangeInclusive<usize> {
        self.left..=self.right
    }
}

/// Validates `(n, tasks)` under `policy` without building chunks.
pub fn check_shape(n: usize, tasks: usize, policy: RemainderPolicy) -> Result<(), StencilError> {
    if tasks == 0 {
        return Err(StencilError::NoTasks);
    }
    if n == 0 {
        return Err(StencilError::EmptyDomain);
    }
    // An empty chunk would put two non-adjacent workers on either side of a
    // shared boundary index.
    if tasks > n {
        return Err(StencilError::TooManyTasks { n, tasks });
    }
    if policy == RemainderPolicy::Reject && n % tasks != 0 {
        return Err(StencilError::UnevenPartition { n, tasks });
    }
    Ok(())
}

/// Splits `[1..n]` into `tasks` contiguous, disjoint chunks ordered by worker id.
pub fn partition(n: usize, tasks: usize, policy: RemainderPolicy) -> Result<Vec<Chunk>, StencilError> {
    check_shape(n, tasks, policy)?;
    let base = n / tasks;
    let extra = n % tasks;
    let mut chunks = Vec::with_capacity(tasks);
    let mut left = 1;
    for worker in 0..tasks {
        let len = base + usize::from(worker < extra);
        chunks.push(Chunk { worker, left, right: left + len - 1 });
        left += len;
    }
    debug_assert_eq!(left, n + 1);
    Ok(chunks)
}

/// Worker that writes index `j`, or `None` for sentinels and out-of-range indices.
pub fn owner_of(chunks: &[Chunk], j: usize) -> Option<usize> {
    let idx = chunks.partition_point(|c| c.right < j);
    chunks.get(idx).filter(|c| c.contains(j)).map(|c| c.worker)
}
