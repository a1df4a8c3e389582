//! Synchronization primitives for the parallel engines.
//!
//! - [`GroupBarrier`]: every registered party waits for every other party.
//! - [`PhaseCounter`]: one counter per worker, advanced by its owner and
//!   awaited by its neighbours.
//! - [`NeighborSync`]: the fuzzy-barrier protocol over a row of counters.
//!
//! All blocking calls are cancellable. A cancelled wait returns
//! [`StencilError::Cancelled`](crate::error::StencilError::Cancelled) instead
//! of proceeding with data that may not have been published yet.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

pub mod barrier;
pub use barrier::GroupBarrier;

pub mod phaser;
pub use phaser::PhaseCounter;

pub mod neighbors;
pub use neighbors::{NeighborSync, Neighbors, SyncPoint};

/// Something whose blocked waiters can be woken with a cancellation error.
pub trait Cancel: Send + Sync {
    /// Wakes every waiter; current and future waits fail with `Cancelled`.
    fn cancel(&self);
    fn is_cancelled(&self) -> bool;
}

impl<C: Cancel + ?Sized> Cancel for Arc<C> {
    fn cancel(&self) {
        (**self).cancel()
    }
    fn is_cancelled(&self) -> bool {
        (**self).is_cancelled()
    }
}

/// Handle for aborting runs from another thread.
///
/// Primitives are attached weakly, so a handle can outlive many runs.
/// Once fired, an interrupt stays fired and cancels anything attached later.
#[derive(Clone, Default)]
pub struct Interrupt {
    inner: Arc<Mutex<InterruptState>>,
}

#[derive(Default)]
struct InterruptState {
    fired: bool,
    targets: Vec<Weak<dyn Cancel>>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fire(&self) {
        let targets = {
            let mut state = self.inner.lock();
            state.fired = true;
            std::mem::take(&mut state.targets)
        };
        tracing::debug!(targets = targets.len(), "interrupt fired");
        for target in targets.iter().filter_map(Weak::upgrade) {
            target.cancel();
        }
    }

    pub fn is_fired(&self) -> bool {
        self.inner.lock().fired
    }

    pub fn attach<C: Cancel + 'static>(&self, target: &Arc<C>) {
        let weak: Weak<dyn Cancel> = Arc::downgrade(target) as Weak<dyn Cancel>;
        let fired = {
            let mut state = self.inner.lock();
            if !state.fired {
                state.targets.retain(|t| t.strong_count() > 0);
                state.targets.push(weak);
            }
            state.fired
        };
        if fired {
            target.cancel();
        }
    }
}

impl fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("Interrupt")
            .field("fired", &state.fired)
            .field("targets", &state.targets.len())
            .finish()
    }
}
