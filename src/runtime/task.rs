//! Stored tasks, completion slots, and task handles.
//!
//! Every spawned task owns a completion slot shared with its
//! [`TaskHandle`]. The task writes exactly one terminal [`Outcome`] into
//! the slot; the slot retains it, so the handle can be queried any number
//! of times after settlement and always sees the identical outcome.

use crate::types::{Outcome, TaskId};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

/// A spawned future, type-erased for storage in the runtime.
pub(crate) type StoredTask = Pin<Box<dyn Future<Output = ()>>>;

/// Completion state shared between a running task and its handle.
#[derive(Debug)]
pub(crate) struct Slot<T, E> {
    outcome: Option<Outcome<T, E>>,
    waiter: Option<Waker>,
}

pub(crate) type SlotRef<T, E> = Arc<Mutex<Slot<T, E>>>;

pub(crate) fn new_slot<T, E>() -> SlotRef<T, E> {
    Arc::new(Mutex::new(Slot {
        outcome: None,
        waiter: None,
    }))
}

/// Writes the terminal outcome into a slot and wakes the registered waiter.
///
/// A slot settles at most once; a second write would violate the
/// one-terminal-event-per-task contract and is ignored.
pub(crate) fn settle_slot<T, E>(slot: &SlotRef<T, E>, outcome: Outcome<T, E>) {
    let mut guard = slot.lock().expect("slot lock poisoned");
    if guard.outcome.is_some() {
        debug_assert!(false, "task slot settled twice");
        return;
    }
    guard.outcome = Some(outcome);
    if let Some(waker) = guard.waiter.take() {
        waker.wake();
    }
}

/// An observer handle for a spawned task.
///
/// A handle does not own or drive the task; the runtime does. It only
/// receives the task's single terminal outcome. Dropping the handle does
/// not cancel the task.
///
/// Awaiting the handle yields a clone of the outcome, leaving the slot
/// settled so later queries still succeed. At most one waiter is supported
/// at a time: the most recently registered waker is the one woken on
/// completion.
#[derive(Debug)]
pub struct TaskHandle<T, E> {
    id: TaskId,
    slot: SlotRef<T, E>,
}

impl<T, E> TaskHandle<T, E> {
    pub(crate) fn new(id: TaskId, slot: SlotRef<T, E>) -> Self {
        Self { id, slot }
    }

    /// Returns the id of the task this handle observes.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns true if the task has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.slot.lock().expect("slot lock poisoned").outcome.is_some()
    }
}

impl<T: Clone, E: Clone> TaskHandle<T, E> {
    /// Returns the task's outcome if it has settled.
    ///
    /// The outcome stays in the slot; repeated queries return the identical
    /// outcome.
    #[must_use]
    pub fn try_outcome(&self) -> Option<Outcome<T, E>> {
        self.slot
            .lock()
            .expect("slot lock poisoned")
            .outcome
            .clone()
    }

    /// Polls for the terminal outcome, registering `cx`'s waker if the task
    /// is still pending.
    pub(crate) fn poll_settled(&self, cx: &mut Context<'_>) -> Poll<Outcome<T, E>> {
        let mut guard = self.slot.lock().expect("slot lock poisoned");
        if let Some(outcome) = &guard.outcome {
            Poll::Ready(outcome.clone())
        } else {
            guard.waiter = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

impl<T: Clone, E: Clone> Future for TaskHandle<T, E> {
    type Output = Outcome<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.poll_settled(cx)
    }
}
