// Reusable group barrier with bulk registration

use parking_lot::{Condvar, Mutex};

use super::Cancel;
use crate::error::StencilError;

/// Cyclic barrier over a registered number of parties.
///
/// Each call to [`arrive_and_await_advance`](Self::arrive_and_await_advance)
/// blocks until every registered party has arrived for the current phase;
/// the last arrival advances the phase and releases everyone at once.
/// Releasing goes through the internal mutex, so all writes made before
/// arriving are visible to every party after the release.
#[derive(Debug, Default)]
pub struct GroupBarrier {
    state: Mutex<BarrierState>,
    released: Condvar,
}

#[derive(Debug, Default)]
struct BarrierState {
    parties: usize,
    arrived: usize,
    phase: u64,
    cancelled: bool,
}

impl GroupBarrier {
    /// Barrier with no parties at phase 0; call [`register`](Self::register) before use.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parties(parties: usize) -> Self {
        let barrier = Self::new();
        barrier.register(parties);
        barrier
    }

    /// Adds `count` parties and returns the current phase.
    pub fn register(&self, count: usize) -> u64 {
        let mut state = self.state.lock();
        state.parties += count;
        state.phase
    }

    pub fn parties(&self) -> usize {
        self.state.lock().parties
    }

    pub fn phase(&self) -> u64 {
        self.state.lock().phase
    }

    /// Arrives and blocks until all parties have arrived. Returns the new phase.
    pub fn arrive_and_await_advance(&self) -> Result<u64, StencilError> {
        let mut state = self.state.lock();
        if state.cancelled {
            return Err(StencilError::Cancelled);
        }
        if state.parties == 0 {
            return Err(StencilError::NoParties);
        }
        state.arrived += 1;
        if state.arrived >= state.parties {
            state.arrived = 0;
            state.phase += 1;
            self.released.notify_all();
            return Ok(state.phase);
        }
        let phase = state.phase;
        while state.phase == phase && !state.cancelled {
            self.released.wait(&mut state);
        }
        if state.phase == phase {
            Err(StencilError::Cancelled)
        } else {
            Ok(state.phase)
        }
    }
}

impl Cancel for GroupBarrier {
    fn cancel(&self) {
        let mut state = self.state.lock();
        state.cancelled = true;
        self.released.notify_all();
    }

    fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn single_party_never_blocks() {
        let barrier = GroupBarrier::with_parties(1);
        assert_eq!(barrier.arrive_and_await_advance().unwrap(), 1);
        assert_eq!(barrier.arrive_and_await_advance().unwrap(), 2);
        assert_eq!(barrier.phase(), 2);
    }

    #[test]
    fn bulk_register_accumulates() {
        let barrier = GroupBarrier::new();
        assert_eq!(barrier.register(2), 0);
        barrier.register(3);
        assert_eq!(barrier.parties(), 5);
    }

    #[test]
    fn no_parties_is_an_error() {
        let barrier = GroupBarrier::new();
        assert!(matches!(barrier.arrive_and_await_advance(), Err(StencilError::NoParties)));
    }

    #[test]
    fn nobody_passes_before_everyone_arrives() {
        const PARTIES: usize = 4;
        const ROUNDS: usize = 50;
        let barrier = GroupBarrier::with_parties(PARTIES);
        let arrivals = AtomicUsize::new(0);
        thread::scope(|s| {
            for _ in 0..PARTIES {
                s.spawn(|| {
                    for round in 0..ROUNDS {
                        arrivals.fetch_add(1, Ordering::SeqCst);
                        let phase = barrier.arrive_and_await_advance().unwrap();
                        assert_eq!(phase, round as u64 + 1);
                        assert!(arrivals.load(Ordering::SeqCst) >= (round + 1) * PARTIES);
                    }
                });
            }
        });
        assert_eq!(barrier.phase(), ROUNDS as u64);
    }

    #[test]
    fn cancel_wakes_blocked_party() {
        let barrier = GroupBarrier::with_parties(2);
        thread::scope(|s| {
            let waiter = s.spawn(|| barrier.arrive_and_await_advance());
            thread::sleep(Duration::from_millis(20));
            barrier.cancel();
            assert!(matches!(waiter.join().unwrap(), Err(StencilError::Cancelled)));
        });
        assert!(matches!(barrier.arrive_and_await_advance(), Err(StencilError::Cancelled)));
    }
}
