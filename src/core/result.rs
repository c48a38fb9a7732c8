//! One-shot result handoff between a worker and the submitting thread.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::core::error::PoolError;
use crate::core::value::TaskValue;

/// Delivery state of a cell.
#[derive(Debug)]
struct Slot {
    value: Option<TaskValue>,
    delivered: bool,
}

/// Shared one-shot cell a worker publishes into and a submitter waits on.
///
/// Exactly two threads touch a cell: the worker that ran the bound task
/// writes once, the submitter reads once. The mutex/condvar pair gives the
/// value write in [`ResultCell::publish`] a happens-before edge to the read
/// in [`ResultCell::wait`], and either call may come first. The cell does not
/// participate in the pool mutex.
#[derive(Debug)]
pub(crate) struct ResultCell {
    slot: Mutex<Slot>,
    ready: Condvar,
    valid: bool,
}

impl ResultCell {
    /// A cell that will receive a published value.
    pub(crate) fn new() -> Self {
        Self { slot: Mutex::new(Slot { value: None, delivered: false }), ready: Condvar::new(), valid: true }
    }

    /// A cell for a rejected submission: no value will ever arrive.
    pub(crate) const fn invalid() -> Self {
        Self { slot: Mutex::new(Slot { value: None, delivered: false }), ready: Condvar::new(), valid: false }
    }

    pub(crate) const fn is_valid(&self) -> bool {
        self.valid
    }

    /// Deliver the task's value and wake the waiter. The first write wins;
    /// publishing into an invalid cell is a no-op.
    pub(crate) fn publish(&self, value: TaskValue) {
        if !self.valid {
            return;
        }
        let mut slot = self.slot.lock();
        if slot.delivered {
            return;
        }
        slot.value = Some(value);
        slot.delivered = true;
        self.ready.notify_all();
    }

    /// Block until a value has been published, then take it. An invalid cell
    /// yields the empty value immediately without blocking.
    pub(crate) fn wait(&self) -> TaskValue {
        if !self.valid {
            return TaskValue::empty();
        }
        let mut slot = self.slot.lock();
        self.ready.wait_while(&mut slot, |s| !s.delivered);
        slot.value.take().unwrap_or_else(TaskValue::empty)
    }
}

/// Handle to the result of one submitted task.
///
/// Returned by [`crate::ThreadPool::submit`]. [`JobHandle::get`] blocks until
/// the task has run and consumes the handle, making the handoff one-shot by
/// construction. A handle whose submission overflowed the queue reports
/// `is_valid() == false` and yields the empty value without blocking.
#[derive(Debug)]
pub struct JobHandle {
    cell: Arc<ResultCell>,
}

impl JobHandle {
    pub(crate) const fn new(cell: Arc<ResultCell>) -> Self {
        Self { cell }
    }

    /// Handle for a submission the queue never accepted.
    pub(crate) fn rejected() -> Self {
        Self { cell: Arc::new(ResultCell::invalid()) }
    }

    /// Whether a result will ever arrive. `false` means the submission was
    /// rejected on queue overflow.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.cell.is_valid()
    }

    /// Block until the task has run, then return its value.
    ///
    /// The value is empty when the handle is invalid or the task's closure
    /// panicked.
    #[must_use]
    pub fn get(self) -> TaskValue {
        self.cell.wait()
    }

    /// Block for the task's value and extract it as `T`.
    ///
    /// # Errors
    ///
    /// [`PoolError::NoValue`] when the handle is invalid or the task
    /// panicked; [`PoolError::TypeMismatch`] when the task produced a
    /// different type.
    pub fn get_as<T: Send + 'static>(self) -> Result<T, PoolError> {
        self.get().downcast()
    }
}
