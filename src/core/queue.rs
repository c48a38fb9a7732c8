//! Bounded FIFO of pending jobs.

use std::collections::VecDeque;

use crate::core::task::Job;

/// FIFO queue of pending jobs with a capacity threshold.
///
/// The queue carries no lock of its own: it lives inside the pool's single
/// mutex together with the worker registry and the running flag, so every
/// size check and mutation shares one consistency domain. Callers check
/// [`TaskQueue::has_space`] under that mutex before pushing, which keeps
/// `len <= capacity` at all times.
pub(crate) struct TaskQueue {
    jobs: VecDeque<Job>,
    capacity: usize,
}

impl TaskQueue {
    pub(crate) const fn new(capacity: usize) -> Self {
        Self { jobs: VecDeque::new(), capacity }
    }

    /// Adjust the capacity threshold. Only meaningful before the pool
    /// starts; the controller enforces that.
    pub(crate) fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub(crate) const fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// The `not_full` predicate.
    pub(crate) fn has_space(&self) -> bool {
        self.jobs.len() < self.capacity
    }

    /// Append an accepted job.
    pub(crate) fn push(&mut self, job: Job) {
        debug_assert!(self.has_space(), "push on a full queue");
        self.jobs.push_back(job);
    }

    /// Claim the oldest accepted job.
    pub(crate) fn pop(&mut self) -> Option<Job> {
        self.jobs.pop_front()
    }
}
