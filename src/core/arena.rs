//! Shared buffer pair for the parallel engines.
//!
//! Every cell is an `f64` stored bit-for-bit in an `AtomicU64` and accessed
//! with relaxed ordering. The atomics only make concurrent access to the
//! shared array well-defined; ordering between a writer and a reader on the
//! other side of a chunk boundary comes from the barrier or phase counter the
//! engine synchronizes through.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::StencilError;

#[derive(Debug, Default)]
#[repr(transparent)]
pub struct AtomicF64(AtomicU64);

impl AtomicF64 {
    pub fn new(v: f64) -> Self {
        Self(AtomicU64::new(v.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, v: f64) {
        self.0.store(v.to_bits(), Ordering::Relaxed)
    }
}

/// The `next`/`current` pair, copied in from caller slices and copied back
/// out once a run succeeds.
#[derive(Debug)]
pub struct BufferArena {
    next: Box<[AtomicF64]>,
    current: Box<[AtomicF64]>,
}

impl BufferArena {
    pub fn load(next: &[f64], current: &[f64]) -> Self {
        let cells = |s: &[f64]| s.iter().copied().map(AtomicF64::new).collect::<Box<[_]>>();
        Self {
            next: cells(next),
            current: cells(current),
        }
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// `(next, current)` as seen before the first iteration.
    pub fn pair(&self) -> (&[AtomicF64], &[AtomicF64]) {
        (&self.next, &self.current)
    }

    /// Copies both buffers back, preserving which slice is which.
    pub fn store_into(&self, next: &mut [f64], current: &mut [f64]) {
        for (dst, cell) in next.iter_mut().zip(self.next.iter()) {
            *dst = cell.load();
        }
        for (dst, cell) in current.iter_mut().zip(self.current.iter()) {
            *dst = cell.load();
        }
    }
}

/// Both buffers must hold the `n` interior points plus the two sentinels.
pub fn check_buffers(next: &[f64], current: &[f64], n: usize) -> Result<(), StencilError> {
    if n == 0 {
        return Err(StencilError::EmptyDomain);
    }
    let expected = n + 2;
    for (buffer, actual) in [("next", next.len()), ("current", current.len())] {
        if actual != expected {
            return Err(StencilError::BufferLength { buffer, expected, actual });
        }
    }
    Ok(())
}
