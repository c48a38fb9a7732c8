//! Registry of living workers.

use std::collections::HashMap;
use std::thread::Thread;

/// Stable identifier for a worker. Ids increase monotonically from a
/// per-pool counter and are never reused.
pub(crate) type WorkerId = u64;

/// Mapping from worker id to the worker's thread handle.
///
/// All mutations happen under the pool mutex, so `len()` is the
/// authoritative count of living workers at every point a worker inspects
/// the queue. Co-locating the registry with the queue avoids a second
/// lock-order axis.
pub(crate) struct WorkerRegistry {
    workers: HashMap<WorkerId, Thread>,
    next_id: WorkerId,
}

impl WorkerRegistry {
    pub(crate) fn new() -> Self {
        Self { workers: HashMap::new(), next_id: 0 }
    }

    /// Allocate the id for the next worker to spawn.
    pub(crate) fn next_id(&mut self) -> WorkerId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn insert(&mut self, id: WorkerId, thread: Thread) {
        self.workers.insert(id, thread);
    }

    pub(crate) fn erase(&mut self, id: WorkerId) -> Option<Thread> {
        self.workers.remove(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.workers.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
