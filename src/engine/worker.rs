//! Worker plumbing shared by the parallel engines.

use std::thread;

use crate::config::Strategy;
use crate::core::arena::AtomicF64;
use crate::error::StencilError;
use crate::parallel::Cancel;
use crate::utils::partition::Chunk;

/// One sweep of the two-neighbour average over `chunk`, reading `src` and writing `dst`.
#[inline]
pub(crate) fn relax(src: &[AtomicF64], dst: &[AtomicF64], chunk: &Chunk) {
    let mut left = src[chunk.left - 1].load();
    let mut mid = src[chunk.left].load();
    for j in chunk.range() {
        let right = src[j + 1].load();
        dst[j].store((left + right) / 2.0);
        left = mid;
        mid = right;
    }
}

/// Cancels the run's primitives when a worker unwinds, so peers blocked on
/// it return `Cancelled` instead of waiting forever.
struct AbortOnPanic<'a> {
    sync: &'a dyn Cancel,
    worker: usize,
}

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            tracing::warn!(worker = self.worker, "worker panicked, cancelling run");
            self.sync.cancel();
        }
    }
}

// Spawn failures outrank panics, which outrank ordinary worker errors.
fn severity(err: &StencilError) -> u8 {
    match err {
        StencilError::Spawn { .. } => 2,
        StencilError::WorkerPanicked(_) => 1,
        _ => 0,
    }
}

fn keep_worst(slot: &mut Option<StencilError>, err: StencilError) {
    match slot {
        Some(prev) if severity(prev) >= severity(&err) => {}
        _ => *slot = Some(err),
    }
}

/// Runs `body` on one scoped thread per chunk and joins them all.
///
/// Threads are named `stencil-<strategy>-<worker>`. Any failure (spawn error,
/// panic, or an error returned by `body`) makes the whole call fail; results
/// come back in worker order on success.
pub(crate) fn run_workers<T, F>(
    strategy: Strategy,
    chunks: &[Chunk],
    sync: &dyn Cancel,
    body: F,
) -> Result<Vec<T>, StencilError>
where
    T: Send,
    F: Fn(&Chunk) -> Result<T, StencilError> + Sync,
{
    thread::scope(|s| {
        let body = &body;
        let mut failure = None;
        let mut handles = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let spawned = thread::Builder::new()
                .name(format!("stencil-{strategy}-{}", chunk.worker))
                .spawn_scoped(s, move || {
                    let _guard = AbortOnPanic { sync, worker: chunk.worker };
                    body(chunk)
                });
            match spawned {
                Ok(handle) => handles.push((chunk.worker, handle)),
                Err(source) => {
                    // Already-running workers would wait on the missing one forever.
                    sync.cancel();
                    failure = Some(StencilError::Spawn { worker: chunk.worker, source });
                    break;
                }
            }
        }

        let mut results = Vec::with_capacity(handles.len());
        for (worker, handle) in handles {
            match handle.join() {
                Ok(Ok(value)) => results.push(value),
                Ok(Err(err)) => {
                    tracing::warn!(worker, error = %err, "worker aborted");
                    keep_worst(&mut failure, err);
                }
                Err(_) => keep_worst(&mut failure, StencilError::WorkerPanicked(worker)),
            }
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(results),
        }
    })
}
