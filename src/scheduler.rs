//! Cancellable delayed tasks.
//!
//! The bridge is single threaded: tasks are not run by a timer thread, the host calls
//! [`DeferredQueue::take_due`] from its event loop and executes what is returned.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

struct Scheduled<T> {
    id: TaskId,
    due: Instant,
    task: T,
}

pub struct DeferredQueue<T> {
    next_id: u64,
    tasks: Vec<Scheduled<T>>,
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            tasks: vec![],
        }
    }
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `task` to become due `delay` after `now`.
    /// A delay that overflows the clock makes the task due at `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration, task: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        let due = now.checked_add(delay).unwrap_or_else(|| {
            log::warn!(target: "bridge", "delay {delay:?} overflows the clock, task is due now");
            now
        });
        self.tasks.push(Scheduled { id, due, task });
        id
    }

    /// Remove a task before it runs. Return the task if it was still pending.
    pub fn cancel(&mut self, id: TaskId) -> Option<T> {
        let pos = self.tasks.iter().position(|s| s.id == id)?;
        Some(self.tasks.remove(pos).task)
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|s| s.id == id)
    }

    /// Remove and return every task due at `now`, earliest first.
    /// Tasks with equal deadlines keep scheduling order.
    pub fn take_due(&mut self, now: Instant) -> Vec<(TaskId, T)> {
        let mut due = vec![];
        let mut i = 0;
        while i < self.tasks.len() {
            if self.tasks[i].due <= now {
                due.push(self.tasks.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|s| s.due);
        due.into_iter().map(|s| (s.id, s.task)).collect()
    }

    /// Earliest deadline, used by hosts to arm their own timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.tasks.iter().map(|s| s.due).min()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
