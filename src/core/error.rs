//! Error types for pool operations.

use thiserror::Error;

/// Errors produced by the thread pool and its result handles.
///
/// Queue overflow is deliberately absent: a full queue is a back-pressure
/// outcome, surfaced as an invalid [`crate::JobHandle`] rather than an error,
/// so the caller decides whether to retry at the application layer.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool has not been started, or has already shut down.
    #[error("pool is not running")]
    NotRunning,

    /// A result value was extracted as a type other than the one the task
    /// produced.
    #[error("type mismatch: result is not a `{requested}`")]
    TypeMismatch {
        /// Name of the type the caller asked for.
        requested: &'static str,
    },

    /// No result value is present: the submission overflowed the queue or
    /// the task's closure panicked.
    #[error("no result value available")]
    NoValue,

    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal failure, e.g. a worker thread could not be spawned.
    #[error("internal error: {0}")]
    Internal(String),
}
