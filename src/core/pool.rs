//! Pool controller: submission surface, start-up, cached-mode growth, and
//! the draining shutdown protocol.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::{PoolConfig, PoolMode};
use crate::core::error::PoolError;
use crate::core::queue::TaskQueue;
use crate::core::registry::WorkerRegistry;
use crate::core::result::{JobHandle, ResultCell};
use crate::core::task::Job;
use crate::core::worker::spawn_worker;

/// Lock-free counters kept for statistics and logging. Scheduling decisions
/// never consult them; those are made under the pool mutex.
#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    pub submitted: AtomicU64,
    pub completed: AtomicU64,
    pub rejected: AtomicU64,
    pub panicked: AtomicU64,
}

/// Snapshot of pool utilization, from [`ThreadPool::stats`].
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Living workers.
    pub current_workers: usize,
    /// Living workers not currently executing a task.
    pub idle_workers: usize,
    /// Tasks accepted into the queue but not yet claimed by a worker.
    pub queued_tasks: usize,
    /// Tasks accepted into the queue since start.
    pub submitted_tasks: u64,
    /// Tasks whose closure ran to completion.
    pub completed_tasks: u64,
    /// Submissions rejected on queue overflow.
    pub rejected_tasks: u64,
    /// Tasks whose closure panicked.
    pub panicked_tasks: u64,
}

/// Mutable pool state. One mutex guards the queue, the registry, the running
/// flag, and the worker counts: they form a single consistency domain, which
/// also rules out lock-ordering deadlocks.
pub(crate) struct PoolState {
    pub config: PoolConfig,
    pub queue: TaskQueue,
    pub registry: WorkerRegistry,
    pub running: bool,
    pub current_workers: usize,
    pub idle_workers: usize,
    pub initial_workers: usize,
}

/// State and signals shared between the controller and its workers.
pub(crate) struct PoolShared {
    pub state: Mutex<PoolState>,
    /// Signalled after an enqueue and, as a broadcast, on shutdown.
    pub not_empty: Condvar,
    /// Signalled after a dequeue and on shutdown, waking blocked submitters.
    pub not_full: Condvar,
    /// Signalled when a worker erases itself during shutdown.
    pub drained: Condvar,
    pub counters: PoolCounters,
}

/// A bounded worker thread pool.
///
/// Tasks are closures producing any `Send` value; each submission returns a
/// [`JobHandle`] the caller blocks on for that task's result. Two operating
/// modes: [`PoolMode::Fixed`] keeps the worker count constant from
/// [`ThreadPool::start`] to shutdown, [`PoolMode::Cached`] grows the worker
/// set toward `max_workers` under backlog and retires surplus workers that
/// idle past the configured limit.
///
/// Dropping the pool shuts it down gracefully: every task accepted into the
/// queue runs to completion before the drop returns.
///
/// # Examples
///
/// ```
/// use taskpool::ThreadPool;
///
/// let pool = ThreadPool::new();
/// pool.start(2).expect("start pool");
///
/// let handle = pool.submit(|| 6 * 7).expect("submit task");
/// assert_eq!(handle.get_as::<i32>().expect("task result"), 42);
/// ```
pub struct ThreadPool {
    shared: Arc<PoolShared>,
}

impl ThreadPool {
    /// Create a pool with the default configuration: fixed mode, queue
    /// capacity 1024, at most 100 workers.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(PoolConfig::new())
    }

    /// Create a pool from a validated configuration.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] when the configuration fails validation.
    pub fn with_config(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate().map_err(PoolError::InvalidConfig)?;
        Ok(Self::from_config(config))
    }

    fn from_config(config: PoolConfig) -> Self {
        let queue = TaskQueue::new(config.queue_capacity);
        Self {
            shared: Arc::new(PoolShared {
                state: Mutex::new(PoolState {
                    config,
                    queue,
                    registry: WorkerRegistry::new(),
                    running: false,
                    current_workers: 0,
                    idle_workers: 0,
                    initial_workers: 0,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
                drained: Condvar::new(),
                counters: PoolCounters::default(),
            }),
        }
    }

    /// Select the worker population policy. Ignored once running.
    pub fn set_mode(&self, mode: PoolMode) {
        let mut state = self.shared.state.lock();
        if state.running {
            warn!("set_mode ignored: pool already running");
            return;
        }
        state.config.mode = mode;
    }

    /// Set the task queue capacity. Ignored once running.
    pub fn set_queue_capacity(&self, capacity: usize) {
        let mut state = self.shared.state.lock();
        if state.running {
            warn!("set_queue_capacity ignored: pool already running");
            return;
        }
        state.config.queue_capacity = capacity;
        state.queue.set_capacity(capacity);
        debug!(capacity = state.queue.capacity(), "queue capacity configured");
    }

    /// Set the worker-count ceiling for cached mode. Ignored once running.
    pub fn set_max_workers(&self, max_workers: usize) {
        let mut state = self.shared.state.lock();
        if state.running {
            warn!("set_max_workers ignored: pool already running");
            return;
        }
        state.config.max_workers = max_workers;
    }

    /// Set how long `submit` waits for queue space before rejecting.
    /// Ignored once running.
    pub fn set_submit_wait(&self, wait: Duration) {
        let mut state = self.shared.state.lock();
        if state.running {
            warn!("set_submit_wait ignored: pool already running");
            return;
        }
        state.config.submit_wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX);
    }

    /// Set how long a surplus cached-mode worker may idle before retiring.
    /// Ignored once running.
    pub fn set_idle_limit(&self, limit: Duration) {
        let mut state = self.shared.state.lock();
        if state.running {
            warn!("set_idle_limit ignored: pool already running");
            return;
        }
        state.config.idle_limit_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
    }

    /// Start the pool with `initial_workers` workers. In cached mode this is
    /// also the floor the worker count shrinks back to. A second call on a
    /// running pool is a no-op.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] when the configuration or the worker
    /// count is invalid; [`PoolError::Internal`] when a worker thread could
    /// not be spawned.
    pub fn start(&self, initial_workers: usize) -> Result<(), PoolError> {
        let mut state = self.shared.state.lock();
        if state.running {
            warn!("start ignored: pool already running");
            return Ok(());
        }
        state.config.validate().map_err(PoolError::InvalidConfig)?;
        if initial_workers == 0 {
            return Err(PoolError::InvalidConfig("initial worker count must be greater than 0".into()));
        }
        if state.config.mode == PoolMode::Cached && initial_workers > state.config.max_workers {
            return Err(PoolError::InvalidConfig(format!(
                "initial worker count {initial_workers} exceeds max_workers {}",
                state.config.max_workers
            )));
        }

        state.running = true;
        state.initial_workers = initial_workers;
        for _ in 0..initial_workers {
            if let Err(e) = spawn_worker(&self.shared, &mut state) {
                error!(error = %e, "failed to spawn initial worker; aborting start");
                state.running = false;
                self.shared.not_empty.notify_all();
                while !state.registry.is_empty() {
                    self.shared.drained.wait(&mut state);
                }
                return Err(PoolError::Internal(format!("failed to spawn worker thread: {e}")));
            }
        }

        info!(workers = initial_workers, mode = ?state.config.mode, "pool started");
        Ok(())
    }

    /// Start the pool with one worker per hardware thread.
    ///
    /// # Errors
    ///
    /// Same as [`ThreadPool::start`].
    pub fn start_default(&self) -> Result<(), PoolError> {
        self.start(num_cpus::get())
    }

    /// Submit a task for execution.
    ///
    /// Waits a bounded time (default one second) for queue space. On
    /// overflow the returned handle reports `is_valid() == false` and yields
    /// the empty value; the task is not run. In cached mode a submission
    /// that finds more backlog than idle workers grows the worker set by
    /// one, up to `max_workers`.
    ///
    /// # Errors
    ///
    /// [`PoolError::NotRunning`] when the pool has not been started or has
    /// shut down.
    pub fn submit<F, T>(&self, task: F) -> Result<JobHandle, PoolError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let cell = Arc::new(ResultCell::new());
        let job = Job::new(task, Arc::clone(&cell));

        let mut state = self.shared.state.lock();
        let deadline = Instant::now() + state.config.submit_wait();
        loop {
            if !state.running {
                return Err(PoolError::NotRunning);
            }
            if state.queue.has_space() {
                break;
            }
            if self.shared.not_full.wait_until(&mut state, deadline).timed_out() {
                // Capacity may have freed exactly at the deadline.
                if !state.running {
                    return Err(PoolError::NotRunning);
                }
                if state.queue.has_space() {
                    break;
                }
                drop(state);
                self.shared.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!("queue full after bounded wait; rejecting task");
                return Ok(JobHandle::rejected());
            }
        }

        state.queue.push(job);
        self.shared.counters.submitted.fetch_add(1, Ordering::Relaxed);
        self.shared.not_empty.notify_one();

        if state.config.mode == PoolMode::Cached
            && state.queue.len() > state.idle_workers
            && state.current_workers < state.config.max_workers
        {
            match spawn_worker(&self.shared, &mut state) {
                Ok(id) => debug!(
                    worker_id = id,
                    current = state.current_workers,
                    backlog = state.queue.len(),
                    "grew worker set under backlog"
                ),
                Err(e) => error!(error = %e, "failed to grow worker set"),
            }
        }

        Ok(JobHandle::new(cell))
    }

    /// Whether the pool is accepting submissions.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.state.lock().running
    }

    /// Snapshot current pool utilization.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let state = self.shared.state.lock();
        PoolStats {
            current_workers: state.current_workers,
            idle_workers: state.idle_workers,
            queued_tasks: state.queue.len(),
            submitted_tasks: self.shared.counters.submitted.load(Ordering::Relaxed),
            completed_tasks: self.shared.counters.completed.load(Ordering::Relaxed),
            rejected_tasks: self.shared.counters.rejected.load(Ordering::Relaxed),
            panicked_tasks: self.shared.counters.panicked.load(Ordering::Relaxed),
        }
    }

    /// Shut the pool down, draining all accepted work.
    ///
    /// Clears the running flag and wakes every waiter inside the same locked
    /// region, then blocks until the worker registry is empty. Tasks already
    /// in the queue run to completion because workers consult the flag only
    /// when the queue is empty. Called automatically on drop; explicit and
    /// repeated calls are safe.
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        if state.running {
            info!(queued = state.queue.len(), workers = state.current_workers, "shutting down pool");
            state.running = false;
            // The flag write and the wakeup must share one locked region:
            // broadcasting outside it lets a worker slip from "saw running"
            // into an untimed wait between the write and the notify.
            self.shared.not_empty.notify_all();
            self.shared.not_full.notify_all();
        }
        while !state.registry.is_empty() {
            self.shared.drained.wait(&mut state);
        }
    }
}

impl Default for ThreadPool {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}
