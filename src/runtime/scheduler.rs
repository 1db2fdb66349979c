//! Run queue and timer queue for the deterministic executor.
//!
//! Scheduling is FIFO: tasks are polled in the order they were made
//! runnable. Timers are ordered by `(deadline, registration sequence)`, so
//! timers sharing a deadline fire in the order they were registered.

use crate::types::{TaskId, Time};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, VecDeque};
use std::task::Waker;

/// FIFO queue of runnable tasks.
#[derive(Debug, Default)]
pub(crate) struct RunQueue {
    queue: VecDeque<TaskId>,
}

impl RunQueue {
    pub(crate) const fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    pub(crate) fn push(&mut self, task: TaskId) {
        self.queue.push_back(task);
    }

    pub(crate) fn pop(&mut self) -> Option<TaskId> {
        self.queue.pop_front()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// A registered timer: wake `waker` once the clock reaches `deadline`.
#[derive(Debug)]
struct TimerEntry {
    deadline: Time,
    seq: u64,
    waker: Waker,
}

impl TimerEntry {
    const fn key(&self) -> (Time, u64) {
        (self.deadline, self.seq)
    }
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Min-heap of pending timers.
#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    heap: BinaryHeap<Reverse<TimerEntry>>,
    next_seq: u64,
}

impl TimerQueue {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a waker to fire at `deadline`.
    pub(crate) fn register(&mut self, deadline: Time, waker: Waker) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(TimerEntry {
            deadline,
            seq,
            waker,
        }));
    }

    /// Returns the earliest pending deadline, if any.
    pub(crate) fn next_deadline(&self) -> Option<Time> {
        self.heap.peek().map(|Reverse(entry)| entry.deadline)
    }

    /// Pops one timer whose deadline has been reached.
    pub(crate) fn pop_due(&mut self, now: Time) -> Option<Waker> {
        if self.next_deadline()? <= now {
            self.heap.pop().map(|Reverse(entry)| entry.waker)
        } else {
            None
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
