//! Worker execution loop: dequeue, run, idle-retire, shutdown exit.

use std::io;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::MutexGuard;
use tracing::{debug, trace};

use crate::config::PoolMode;
use crate::core::pool::{PoolShared, PoolState};
use crate::core::registry::WorkerId;

/// Interval of the timed idle wait in cached mode. Each timeout is a chance
/// to retire, so an expired idle limit takes effect within one tick.
const IDLE_POLL: Duration = Duration::from_secs(1);

/// Spawn one worker and account for it in the registry and counts.
///
/// Must be called with the pool lock held: the new thread's first action is
/// to take that lock, so the registry insert is visible before the worker's
/// first queue inspection.
pub(crate) fn spawn_worker(
    shared: &Arc<PoolShared>,
    state: &mut PoolState,
) -> io::Result<WorkerId> {
    let id = state.registry.next_id();
    let pool = Arc::clone(shared);
    let handle = thread::Builder::new()
        .name(format!("taskpool-worker-{id}"))
        .spawn(move || worker_loop(&pool, id))?;

    state.registry.insert(id, handle.thread().clone());
    state.current_workers += 1;
    state.idle_workers += 1;
    debug!(worker_id = id, current = state.current_workers, "worker spawned");
    Ok(id)
}

/// Long-running worker body.
///
/// The loop holds the pool lock whenever it inspects the queue or the
/// running flag and releases it around user code. Shutdown is observed only
/// at the empty-queue point, so every task accepted before shutdown drains.
fn worker_loop(shared: &Arc<PoolShared>, id: WorkerId) {
    let mut last_active = Instant::now();
    let mut state = shared.state.lock();
    loop {
        while state.queue.is_empty() {
            if !state.running {
                deregister(&mut state, id);
                shared.drained.notify_all();
                debug!(worker_id = id, "worker exiting: pool shut down");
                return;
            }
            if state.config.mode == PoolMode::Cached {
                let timed_out = shared.not_empty.wait_for(&mut state, IDLE_POLL).timed_out();
                // A timeout that races the shutdown broadcast must not take
                // the retire path: the loop re-checks the running flag so
                // the drained signal cannot be lost.
                if timed_out
                    && state.running
                    && state.current_workers > state.initial_workers
                    && last_active.elapsed() >= state.config.idle_limit()
                {
                    deregister(&mut state, id);
                    debug!(worker_id = id, current = state.current_workers, "surplus worker retired");
                    return;
                }
            } else {
                shared.not_empty.wait(&mut state);
            }
        }

        let Some(job) = state.queue.pop() else { continue };
        state.idle_workers -= 1;
        if !state.queue.is_empty() {
            shared.not_empty.notify_all();
        }
        shared.not_full.notify_all();

        let completed = MutexGuard::unlocked(&mut state, || job.exec());
        if completed {
            shared.counters.completed.fetch_add(1, Ordering::Relaxed);
        } else {
            shared.counters.panicked.fetch_add(1, Ordering::Relaxed);
        }

        state.idle_workers += 1;
        last_active = Instant::now();
    }
}

/// Remove a worker from the registry and the counts. Callers hold the pool
/// lock.
fn deregister(state: &mut PoolState, id: WorkerId) {
    let handle = state.registry.erase(id);
    state.current_workers -= 1;
    state.idle_workers -= 1;
    trace!(
        worker_id = id,
        thread = ?handle.as_ref().and_then(|t| t.name()),
        remaining = state.registry.len(),
        "worker deregistered"
    );
}
