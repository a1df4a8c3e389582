//! Averaging engines: sequential reference, global barrier, fuzzy barrier.

use crate::error::StencilError;
use crate::parallel::Interrupt;

pub mod sequential;
pub use sequential::{Sequential, run_sequential};

pub mod barrier;
pub use barrier::{BarrierEngine, run_parallel_barrier};

pub mod fuzzy;
pub use fuzzy::{FuzzyEngine, run_parallel_fuzzy_barrier};

pub(crate) mod worker;

/// Fails with `Cancelled` if the run was aborted before it started.
pub(crate) fn check_interrupt(interrupt: Option<&Interrupt>) -> Result<(), StencilError> {
    match interrupt {
        Some(i) if i.is_fired() => Err(StencilError::Cancelled),
        _ => Ok(()),
    }
}
