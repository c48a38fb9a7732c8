//! # Taskpool
//!
//! A bounded worker thread pool with two operating modes: **fixed**, where
//! the worker count is constant from start to shutdown, and **cached**,
//! where the worker set grows toward a ceiling under backlog and shrinks
//! back to its initial size as surplus workers idle out.
//!
//! ## Design
//!
//! - **Single lock domain**: one mutex guards the FIFO task queue, the
//!   worker registry, the running flag, and the worker counts, with three
//!   condition predicates (`not_full`, `not_empty`, drained) on that mutex.
//!   There is no second lock-order axis.
//! - **Back-pressure**: `submit` waits a bounded time (default one second)
//!   for queue space and then reports overflow through an invalid
//!   [`JobHandle`] instead of blocking forever. The caller decides whether
//!   to retry.
//! - **One-shot results**: every task gets its own result cell; the
//!   submitter blocks on [`JobHandle::get`] until the worker publishes.
//!   Panics in user code are suppressed and surface as the empty value.
//! - **Draining shutdown**: dropping the pool wakes every worker under the
//!   lock and waits for the registry to empty. Workers observe shutdown
//!   only at the empty-queue point, so every accepted task completes.
//!
//! ## Quick example
//!
//! ```
//! use taskpool::{PoolMode, ThreadPool};
//!
//! let pool = ThreadPool::new();
//! pool.set_mode(PoolMode::Fixed);
//! pool.start(2).expect("start pool");
//!
//! let handles: Vec<_> = (0..4_u64)
//!     .map(|i| pool.submit(move || i * i).expect("submit task"))
//!     .collect();
//!
//! let squares: Vec<u64> = handles
//!     .into_iter()
//!     .map(|h| h.get_as::<u64>().expect("task result"))
//!     .collect();
//! assert_eq!(squares, vec![0, 1, 4, 9]);
//! ```

#![deny(warnings)]
#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core concurrency engine: queue, workers, result handoff, controller.
pub mod core;
/// Configuration models for the pool.
pub mod config;
/// Shared utilities.
pub mod util;

pub use self::config::{PoolConfig, PoolMode};
pub use self::core::{JobHandle, PoolError, PoolStats, TaskValue, ThreadPool};
