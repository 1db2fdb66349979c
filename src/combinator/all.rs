//! All combinator: wait for every task, fail on the first failure.
//!
//! [`all`] aggregates an ordered sequence of task handles into one
//! settlement:
//!
//! - if every task fulfills, the combinator settles `Ok` with the values in
//!   **input order**, regardless of completion order;
//! - if any task rejects, the combinator settles `Err` with the reason of
//!   the first rejection it observes, by completion time.
//!
//! # Semantics
//!
//! `all([t1, t2, ..., tn])`:
//! 1. Observe each handle (the tasks are already scheduled; the combinator
//!    starts nothing).
//! 2. Record fulfilled values in their input slots.
//! 3. Settle `Err` the moment a rejection is delivered, or `Ok` once all
//!    slots are filled.
//!
//! **Key property**: rejection order is completion time, not input
//! position. A task at index 2 rejecting at t=500 beats a task at index 1
//! rejecting at t=1000.
//!
//! Settlement is terminal and exactly-once: after the first terminal
//! result, the combinator replays the identical result on every poll, and
//! later completions of remaining tasks cannot alter it. The combinator
//! never cancels, retries, or re-runs anything; tasks still pending at
//! settlement keep running on the substrate.
//!
//! # Tie-break
//!
//! When several rejections are delivered in the same scheduling tick, the
//! one with the lowest input index wins. Handles are scanned in input
//! order per notification, and the substrate fires equal-deadline timers
//! in registration order, so the rule is stable.

use crate::runtime::TaskHandle;
use crate::types::Outcome;
use core::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::debug;

/// The reason the combinator settled rejected: the first task rejection it
/// observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection<E> {
    /// Input position of the rejecting task.
    pub index: usize,
    /// The task's opaque rejection reason, surfaced unchanged.
    pub reason: E,
}

impl<E: fmt::Display> fmt::Display for Rejection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {} rejected: {}", self.index, self.reason)
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Rejection<E> {}

/// Result type for the [`all`] combinator.
pub type AllResult<T, E> = Result<Vec<T>, Rejection<E>>;

/// Future returned by [`all`].
///
/// Settles exactly once; polling after settlement replays the identical
/// result.
#[derive(Debug)]
pub struct All<T, E> {
    handles: Vec<TaskHandle<T, E>>,
    values: Vec<Option<T>>,
    remaining: usize,
    settled: Option<AllResult<T, E>>,
}

impl<T, E> All<T, E> {
    /// Returns true if the combinator has settled.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        self.settled.is_some()
    }

    /// Returns the number of input tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns true if the input sequence was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Waits for all tasks to fulfill, or settles with the first rejection by
/// completion time.
///
/// The tasks behind `handles` are already scheduled; this combinator only
/// observes their terminal outcomes. An empty input settles immediately as
/// `Ok(vec![])`.
///
/// # Example
///
/// ```
/// use conjoin::{all, Runtime};
/// use std::time::Duration;
///
/// let mut rt = Runtime::new();
/// let timer = rt.handle();
/// let a = rt.spawn(async { Ok::<_, String>(1) });
/// let t = timer.clone();
/// let b = rt.spawn(async move {
///     t.sleep(Duration::from_millis(1000)).await;
///     Err::<i32, _>("p2 error".to_string())
/// });
/// let c = rt.spawn(async move {
///     timer.sleep(Duration::from_millis(500)).await;
///     Err::<i32, _>("p3 error".to_string())
/// });
///
/// // The rejection at 500ms wins over the one at 1000ms, despite input order.
/// let settled = rt.block_on(all(vec![a, b, c])).unwrap();
/// assert_eq!(settled.unwrap_err().reason, "p3 error");
/// ```
#[must_use]
pub fn all<T, E>(handles: Vec<TaskHandle<T, E>>) -> All<T, E> {
    let remaining = handles.len();
    let values = (0..remaining).map(|_| None).collect();
    All {
        handles,
        values,
        remaining,
        settled: None,
    }
}

impl<T: Clone + Unpin, E: Clone + Unpin> Future for All<T, E> {
    type Output = AllResult<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if let Some(settled) = &this.settled {
            return Poll::Ready(settled.clone());
        }

        // Scan in input order; among completions delivered in the same
        // tick, the lowest index is observed first.
        for (index, handle) in this.handles.iter().enumerate() {
            if this.values[index].is_some() {
                continue;
            }
            match handle.poll_settled(cx) {
                Poll::Ready(Outcome::Fulfilled(value)) => {
                    this.values[index] = Some(value);
                    this.remaining -= 1;
                }
                Poll::Ready(Outcome::Rejected(reason)) => {
                    debug!(index, task = %handle.id(), "all combinator settled rejected");
                    let rejection = Rejection { index, reason };
                    this.settled = Some(Err(rejection.clone()));
                    return Poll::Ready(Err(rejection));
                }
                Poll::Pending => {}
            }
        }

        if this.remaining == 0 {
            let values: Vec<T> = this
                .values
                .iter_mut()
                .map(|slot| slot.take().expect("all slots filled at settlement"))
                .collect();
            debug!(count = values.len(), "all combinator settled fulfilled");
            this.settled = Some(Ok(values.clone()));
            return Poll::Ready(Ok(values));
        }
        Poll::Pending
    }
}

/// Aggregates already-terminal outcomes, input-ordered.
///
/// This is the settled-world form of [`all`]: given one outcome per input
/// task (in input order), returns the values in input order, or the first
/// rejection by input position. Use it when every outcome is already known
/// and no completion-time information remains.
///
/// # Example
///
/// ```
/// use conjoin::combinator::settle_outcomes;
/// use conjoin::Outcome;
///
/// let outcomes: Vec<Outcome<i32, &str>> =
///     vec![Outcome::Fulfilled(1), Outcome::Fulfilled(2)];
/// assert_eq!(settle_outcomes(outcomes), Ok(vec![1, 2]));
/// ```
pub fn settle_outcomes<T, E>(outcomes: Vec<Outcome<T, E>>) -> AllResult<T, E> {
    let mut values = Vec::with_capacity(outcomes.len());
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Outcome::Fulfilled(value) => values.push(value),
            Outcome::Rejected(reason) => return Err(Rejection { index, reason }),
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::task::{new_slot, settle_slot, SlotRef};
    use crate::types::TaskId;
    use std::sync::Arc;
    use std::task::{Wake, Waker};

    struct NoopWake;

    impl Wake for NoopWake {
        fn wake(self: Arc<Self>) {}
    }

    fn noop_waker() -> Waker {
        Waker::from(Arc::new(NoopWake))
    }

    fn handle_pair(index: u64) -> (TaskHandle<i32, &'static str>, SlotRef<i32, &'static str>) {
        let slot = new_slot();
        (
            TaskHandle::new(TaskId::from_raw(index), Arc::clone(&slot)),
            slot,
        )
    }

    fn poll_all(
        fut: &mut All<i32, &'static str>,
        cx: &mut Context<'_>,
    ) -> Poll<AllResult<i32, &'static str>> {
        Pin::new(fut).poll(cx)
    }

    #[test]
    fn empty_input_settles_immediately() {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut fut = all(Vec::<TaskHandle<i32, &str>>::new());
        assert_eq!(poll_all(&mut fut, &mut cx), Poll::Ready(Ok(vec![])));
        assert!(fut.is_settled());
    }

    #[test]
    fn values_keep_input_order_under_reverse_completion() {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let (h0, s0) = handle_pair(0);
        let (h1, s1) = handle_pair(1);
        let (h2, s2) = handle_pair(2);
        let mut fut = all(vec![h0, h1, h2]);

        assert!(poll_all(&mut fut, &mut cx).is_pending());
        settle_slot(&s2, Outcome::Fulfilled(3));
        assert!(poll_all(&mut fut, &mut cx).is_pending());
        settle_slot(&s1, Outcome::Fulfilled(2));
        assert!(poll_all(&mut fut, &mut cx).is_pending());
        settle_slot(&s0, Outcome::Fulfilled(1));
        assert_eq!(poll_all(&mut fut, &mut cx), Poll::Ready(Ok(vec![1, 2, 3])));
    }

    #[test]
    fn first_delivered_rejection_wins() {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let (h0, _s0) = handle_pair(0);
        let (h1, s1) = handle_pair(1);
        let (h2, s2) = handle_pair(2);
        let mut fut = all(vec![h0, h1, h2]);

        assert!(poll_all(&mut fut, &mut cx).is_pending());
        // Index 2 rejects first in time; index 1 only afterwards.
        settle_slot(&s2, Outcome::Rejected("p3 error"));
        assert_eq!(
            poll_all(&mut fut, &mut cx),
            Poll::Ready(Err(Rejection {
                index: 2,
                reason: "p3 error"
            }))
        );
        // A later rejection cannot alter the settled result.
        settle_slot(&s1, Outcome::Rejected("p2 error"));
        assert_eq!(
            poll_all(&mut fut, &mut cx),
            Poll::Ready(Err(Rejection {
                index: 2,
                reason: "p3 error"
            }))
        );
    }

    #[test]
    fn same_tick_rejections_settle_by_input_order() {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let (h0, s0) = handle_pair(0);
        let (h1, s1) = handle_pair(1);
        let (h2, s2) = handle_pair(2);
        // All three outcomes delivered before the combinator is polled.
        settle_slot(&s0, Outcome::Fulfilled(1));
        settle_slot(&s1, Outcome::Rejected("b"));
        settle_slot(&s2, Outcome::Rejected("c"));

        let mut fut = all(vec![h0, h1, h2]);
        assert_eq!(
            poll_all(&mut fut, &mut cx),
            Poll::Ready(Err(Rejection {
                index: 1,
                reason: "b"
            }))
        );
    }

    #[test]
    fn settled_result_replays_identically() {
        let waker = noop_waker();
        let mut cx = Context::from_waker(&waker);
        let (h0, s0) = handle_pair(0);
        settle_slot(&s0, Outcome::Fulfilled(5));
        let mut fut = all(vec![h0]);

        let first = poll_all(&mut fut, &mut cx);
        let second = poll_all(&mut fut, &mut cx);
        assert_eq!(first, Poll::Ready(Ok(vec![5])));
        assert_eq!(first, second);
    }

    #[test]
    fn settle_outcomes_all_fulfilled() {
        let outcomes: Vec<Outcome<i32, &str>> = vec![
            Outcome::Fulfilled(1),
            Outcome::Fulfilled(2),
            Outcome::Fulfilled(3),
        ];
        assert_eq!(settle_outcomes(outcomes), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn settle_outcomes_first_rejection_by_position() {
        let outcomes: Vec<Outcome<i32, &str>> = vec![
            Outcome::Fulfilled(1),
            Outcome::Rejected("first"),
            Outcome::Rejected("second"),
        ];
        assert_eq!(
            settle_outcomes(outcomes),
            Err(Rejection {
                index: 1,
                reason: "first"
            })
        );
    }

    #[test]
    fn settle_outcomes_empty() {
        assert_eq!(settle_outcomes(Vec::<Outcome<i32, &str>>::new()), Ok(vec![]));
    }

    #[test]
    fn rejection_display() {
        let rejection = Rejection {
            index: 2,
            reason: "p3 error",
        };
        assert_eq!(rejection.to_string(), "task 2 rejected: p3 error");
    }
}
