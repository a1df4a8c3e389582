// Single-owner phase counter

use parking_lot::{Condvar, Mutex};

use super::Cancel;
use crate::error::StencilError;

/// A phaser with exactly one registered party, its owner.
///
/// The owner advances the counter with [`arrive`](Self::arrive), which never
/// blocks. Any other thread may block in [`await_advance`](Self::await_advance)
/// until the owner has moved past a given phase. An arrival happens-before
/// every `await_advance` call that observes it.
#[derive(Debug, Default)]
pub struct PhaseCounter {
    state: Mutex<CounterState>,
    advanced: Condvar,
}

#[derive(Debug, Default)]
struct CounterState {
    phase: u64,
    cancelled: bool,
}

impl PhaseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of arrivals so far.
    pub fn phase(&self) -> u64 {
        self.state.lock().phase
    }

    /// Completes the current phase and returns its number (the value before the advance).
    pub fn arrive(&self) -> u64 {
        let mut state = self.state.lock();
        let completed = state.phase;
        state.phase += 1;
        self.advanced.notify_all();
        completed
    }

    /// Blocks until the counter is strictly greater than `phase`; returns the value seen.
    ///
    /// Fails once the counter is cancelled, even if no wait would be needed.
    pub fn await_advance(&self, phase: u64) -> Result<u64, StencilError> {
        let mut state = self.state.lock();
        loop {
            if state.cancelled {
                return Err(StencilError::Cancelled);
            }
            if state.phase > phase {
                return Ok(state.phase);
            }
            self.advanced.wait(&mut state);
        }
    }
}

impl Cancel for PhaseCounter {
    fn cancel(&self) {
        let mut state = self.state.lock();
        state.cancelled = true;
        self.advanced.notify_all();
    }

    fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }
}
