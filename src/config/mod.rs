//! Configuration models for the pool.

pub mod pool;

pub use pool::{PoolConfig, PoolMode};
