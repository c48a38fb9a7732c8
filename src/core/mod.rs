//! Core concurrency engine: bounded task queue, worker population control,
//! one-shot result handoff, and the pool controller.

pub mod error;
pub mod pool;
pub mod result;
pub mod value;

mod queue;
mod registry;
mod task;
mod worker;

pub use error::PoolError;
pub use pool::{PoolStats, ThreadPool};
pub use result::JobHandle;
pub use value::TaskValue;
