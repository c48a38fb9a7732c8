//! Executable unit binding a user closure to its result cell.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use crate::core::result::ResultCell;
use crate::core::value::TaskValue;

/// One unit of user work, queued for execution by exactly one worker.
///
/// The result cell is bound at submission time, before the job becomes
/// visible to any worker. The queue owns the job; the submitter's handle
/// holds its own reference to the cell, so the cell outlives the run no
/// matter which side finishes first.
pub(crate) struct Job {
    run: Box<dyn FnOnce() -> TaskValue + Send + 'static>,
    cell: Arc<ResultCell>,
}

impl Job {
    pub(crate) fn new<F, T>(task: F, cell: Arc<ResultCell>) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        Self { run: Box::new(move || TaskValue::from_value(task())), cell }
    }

    /// Run the closure and publish its value. A panic in user code is caught
    /// and suppressed so the worker survives; the cell then receives the
    /// empty sentinel. Returns `false` when the closure panicked.
    pub(crate) fn exec(self) -> bool {
        let Self { run, cell } = self;
        match panic::catch_unwind(AssertUnwindSafe(run)) {
            Ok(value) => {
                cell.publish(value);
                true
            }
            Err(_) => {
                warn!("task panicked; publishing empty result");
                cell.publish(TaskValue::empty());
                false
            }
        }
    }
}
