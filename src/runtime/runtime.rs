//! The deterministic single-threaded executor.
//!
//! Tasks run cooperatively on one logical thread: the executor polls one
//! task at a time from a FIFO run queue. Time is virtual and only advances
//! while the run queue is idle, jumping to the earliest pending timer
//! deadline. That ordering rule is what makes completion delivery
//! consistent with completion time: everything runnable at t is fully
//! processed before the clock reaches t + 1.

use super::config::RuntimeConfig;
use super::scheduler::{RunQueue, TimerQueue};
use super::task::{new_slot, settle_slot, StoredTask, TaskHandle};
use super::waker::TaskWaker;
use crate::error::RunError;
use crate::time::Sleep;
use crate::types::{Outcome, TaskId, Time};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Waker};
use std::time::Duration;
use tracing::trace;

/// Shared executor state reachable from wakers and handles.
#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) run_queue: Mutex<RunQueue>,
    pub(crate) timers: Mutex<TimerQueue>,
    /// Virtual clock, nanoseconds since epoch.
    pub(crate) now: AtomicU64,
    next_task: AtomicU64,
}

/// A cloneable handle onto a [`Runtime`]'s clock and timer queue.
///
/// Handles are how tasks observe virtual time: `handle.sleep(d).await`
/// suspends the calling task until the clock reaches `now + d`.
#[derive(Debug, Clone)]
pub struct RuntimeHandle {
    pub(crate) inner: Arc<Inner>,
}

impl RuntimeHandle {
    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Time {
        Time::from_nanos(self.inner.now.load(Ordering::SeqCst))
    }

    /// Returns a future that completes once `duration` of virtual time has
    /// passed from now.
    #[must_use]
    pub fn sleep(&self, duration: Duration) -> Sleep {
        self.sleep_until(self.now() + duration)
    }

    /// Returns a future that completes once the clock reaches `deadline`.
    #[must_use]
    pub fn sleep_until(&self, deadline: Time) -> Sleep {
        Sleep::new(self.clone(), deadline)
    }

    /// Registers a waker to fire when the clock reaches `deadline`.
    pub(crate) fn register_timer(&self, deadline: Time, waker: Waker) {
        self.inner
            .timers
            .lock()
            .expect("timer queue lock poisoned")
            .register(deadline, waker);
    }

    fn alloc_task_id(&self) -> TaskId {
        TaskId::from_raw(self.inner.next_task.fetch_add(1, Ordering::Relaxed))
    }
}

/// Deterministic single-threaded runtime with virtual time.
///
/// # Example
///
/// ```
/// use conjoin::Runtime;
///
/// let mut rt = Runtime::new();
/// let handle = rt.spawn(async { Ok::<_, String>(21 * 2) });
/// rt.run_until_quiescent().expect("step limit");
/// assert_eq!(handle.try_outcome().unwrap().into_result(), Ok(42));
/// ```
pub struct Runtime {
    handle: RuntimeHandle,
    tasks: HashMap<TaskId, StoredTask>,
    config: RuntimeConfig,
    steps: u64,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("handle", &self.handle)
            .field("live_tasks", &self.tasks.len())
            .field("config", &self.config)
            .field("steps", &self.steps)
            .finish()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Runtime {
    /// Creates a runtime with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Creates a runtime with the given configuration.
    #[must_use]
    pub fn with_config(config: RuntimeConfig) -> Self {
        Self {
            handle: RuntimeHandle {
                inner: Arc::new(Inner {
                    run_queue: Mutex::new(RunQueue::new()),
                    timers: Mutex::new(TimerQueue::new()),
                    now: AtomicU64::new(0),
                    next_task: AtomicU64::new(0),
                }),
            },
            tasks: HashMap::new(),
            config,
            steps: 0,
        }
    }

    /// Returns a cloneable handle onto this runtime's clock and timers.
    #[must_use]
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Returns the current virtual time.
    #[must_use]
    pub fn now(&self) -> Time {
        self.handle.now()
    }

    /// Returns the total number of task polls executed.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    /// Returns the number of tasks that have not yet completed.
    #[must_use]
    pub fn live_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if nothing is runnable and no timers are pending.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.handle
            .inner
            .run_queue
            .lock()
            .expect("run queue lock poisoned")
            .is_empty()
            && self
                .handle
                .inner
                .timers
                .lock()
                .expect("timer queue lock poisoned")
                .is_empty()
    }

    /// Spawns a task producing a `Result`, immediately scheduling it.
    ///
    /// The task settles its handle with exactly one terminal
    /// [`Outcome`]: `Fulfilled` for `Ok`, `Rejected` for `Err`. The handle
    /// only observes the task; dropping it does not cancel anything.
    pub fn spawn<F, T, E>(&mut self, future: F) -> TaskHandle<T, E>
    where
        F: Future<Output = Result<T, E>> + 'static,
        T: 'static,
        E: 'static,
    {
        let slot = new_slot();
        let task_slot = Arc::clone(&slot);
        let id = self.spawn_raw(async move {
            let outcome = Outcome::from(future.await);
            settle_slot(&task_slot, outcome);
        });
        TaskHandle::new(id, slot)
    }

    fn spawn_raw(&mut self, future: impl Future<Output = ()> + 'static) -> TaskId {
        let id = self.handle.alloc_task_id();
        self.tasks.insert(id, Box::pin(future));
        self.handle
            .inner
            .run_queue
            .lock()
            .expect("run queue lock poisoned")
            .push(id);
        trace!(task = %id, "task spawned");
        id
    }

    /// Polls runnable tasks until the run queue is empty, without advancing
    /// the clock. Returns the number of polls executed.
    pub fn run_ready(&mut self) -> Result<u64, RunError> {
        let start = self.steps;
        self.drain_ready(start)?;
        Ok(self.steps - start)
    }

    /// Runs until no task is runnable and no timer is pending, advancing
    /// the virtual clock to each timer deadline in turn.
    ///
    /// Returns the number of polls executed, or
    /// [`RunError::StepLimitExceeded`] if the configured budget ran out.
    pub fn run_until_quiescent(&mut self) -> Result<u64, RunError> {
        let start = self.steps;
        loop {
            self.drain_ready(start)?;
            if !self.fire_next_timers() {
                break;
            }
        }
        trace!(steps = self.steps - start, now = %self.now(), "runtime quiescent");
        Ok(self.steps - start)
    }

    /// Spawns `future`, drives the runtime to quiescence, and returns the
    /// future's output.
    ///
    /// All other spawned tasks keep running until quiescence too; a result
    /// produced along the way is not cut short by remaining work.
    ///
    /// Returns [`RunError::Stalled`] if the runtime went quiescent without
    /// the future completing (it was waiting on something that can never
    /// happen).
    pub fn block_on<F>(&mut self, future: F) -> Result<F::Output, RunError>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let cell: Arc<Mutex<Option<F::Output>>> = Arc::new(Mutex::new(None));
        let out = Arc::clone(&cell);
        self.spawn_raw(async move {
            *out.lock().expect("result cell lock poisoned") = Some(future.await);
        });
        self.run_until_quiescent()?;
        let result = cell.lock().expect("result cell lock poisoned").take();
        result.ok_or(RunError::Stalled)
    }

    /// Moves the clock forward by `duration` and wakes every timer whose
    /// deadline has been reached. Does not poll anything; follow with
    /// [`run_ready`](Self::run_ready) or
    /// [`run_until_quiescent`](Self::run_until_quiescent).
    pub fn advance_time(&mut self, duration: Duration) {
        let target = self.now() + duration;
        self.handle
            .inner
            .now
            .fetch_max(target.as_nanos(), Ordering::SeqCst);
        trace!(now = %target, "advanced virtual clock");
        let mut timers = self
            .handle
            .inner
            .timers
            .lock()
            .expect("timer queue lock poisoned");
        while let Some(waker) = timers.pop_due(target) {
            waker.wake();
        }
    }

    fn drain_ready(&mut self, budget_start: u64) -> Result<(), RunError> {
        loop {
            let empty = self
                .handle
                .inner
                .run_queue
                .lock()
                .expect("run queue lock poisoned")
                .is_empty();
            if empty {
                return Ok(());
            }
            if let Some(max) = self.config.max_steps {
                if self.steps - budget_start >= max {
                    return Err(RunError::StepLimitExceeded { steps: max });
                }
            }
            self.step();
        }
    }

    /// Pops and polls one runnable task.
    fn step(&mut self) {
        let popped = self
            .handle
            .inner
            .run_queue
            .lock()
            .expect("run queue lock poisoned")
            .pop();
        let Some(task_id) = popped else { return };

        let waker = Waker::from(Arc::new(TaskWaker {
            task_id,
            inner: Arc::clone(&self.handle.inner),
        }));
        let mut cx = Context::from_waker(&waker);

        let Some(task) = self.tasks.get_mut(&task_id) else {
            // Stale wake of a task that already completed.
            trace!(task = %task_id, "stale wake");
            return;
        };
        self.steps += 1;
        if task.as_mut().poll(&mut cx).is_ready() {
            self.tasks.remove(&task_id);
            trace!(task = %task_id, "task completed");
        }
    }

    /// Advances the clock to the earliest pending deadline and wakes every
    /// timer due at that instant. Returns false if no timer is pending.
    fn fire_next_timers(&mut self) -> bool {
        let mut timers = self
            .handle
            .inner
            .timers
            .lock()
            .expect("timer queue lock poisoned");
        let Some(deadline) = timers.next_deadline() else {
            return false;
        };
        self.handle
            .inner
            .now
            .fetch_max(deadline.as_nanos(), Ordering::SeqCst);
        let now = Time::from_nanos(self.handle.inner.now.load(Ordering::SeqCst));
        trace!(now = %now, "advanced virtual clock to deadline");
        while let Some(waker) = timers.pop_due(now) {
            waker.wake();
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::atomic::AtomicBool;
    use std::task::Poll;

    /// Never completes and never registers a waker.
    struct NeverComplete;

    impl Future for NeverComplete {
        type Output = ();

        fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<()> {
            Poll::Pending
        }
    }

    /// Wakes itself on every poll, forever.
    struct BusyYield;

    impl Future for BusyYield {
        type Output = ();

        fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }

    #[test]
    fn spawn_and_run_settles_handle() {
        let mut rt = Runtime::new();
        let executed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&executed);
        let handle = rt.spawn(async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<_, String>(42)
        });

        let steps = rt.run_until_quiescent().expect("step limit");
        assert!(steps > 0);
        assert!(executed.load(Ordering::SeqCst));
        assert_eq!(handle.try_outcome(), Some(Outcome::Fulfilled(42)));
        assert_eq!(rt.live_tasks(), 0);
        assert!(rt.is_quiescent());
    }

    #[test]
    fn rejected_task_settles_with_reason() {
        let mut rt = Runtime::new();
        let handle = rt.spawn(async { Err::<i32, _>("nope".to_string()) });
        rt.run_until_quiescent().expect("step limit");
        assert_eq!(
            handle.try_outcome(),
            Some(Outcome::Rejected("nope".to_string()))
        );
    }

    #[test]
    fn block_on_returns_output() {
        let mut rt = Runtime::new();
        let out = rt.block_on(async { 1 + 2 }).expect("should complete");
        assert_eq!(out, 3);
    }

    #[test]
    fn virtual_time_advances_to_deadlines() {
        let mut rt = Runtime::new();
        let timer = rt.handle();
        let handle = rt.spawn(async move {
            timer.sleep(Duration::from_millis(500)).await;
            Ok::<_, String>(())
        });
        rt.run_until_quiescent().expect("step limit");
        assert!(handle.is_settled());
        assert_eq!(rt.now(), Time::from_millis(500));
    }

    #[test]
    fn clock_stops_at_last_deadline() {
        let mut rt = Runtime::new();
        let timer = rt.handle();
        let t2 = timer.clone();
        rt.spawn(async move {
            timer.sleep(Duration::from_millis(1000)).await;
            Ok::<_, String>(())
        });
        rt.spawn(async move {
            t2.sleep(Duration::from_millis(500)).await;
            Ok::<_, String>(())
        });
        rt.run_until_quiescent().expect("step limit");
        assert_eq!(rt.now(), Time::from_millis(1000));
    }

    #[test]
    fn manual_advance_wakes_due_timers() {
        let mut rt = Runtime::new();
        let timer = rt.handle();
        let handle = rt.spawn(async move {
            timer.sleep(Duration::from_millis(100)).await;
            Ok::<_, String>(7)
        });

        rt.run_ready().expect("step limit");
        assert!(!handle.is_settled());

        rt.advance_time(Duration::from_millis(99));
        rt.run_ready().expect("step limit");
        assert!(!handle.is_settled());

        rt.advance_time(Duration::from_millis(1));
        rt.run_ready().expect("step limit");
        assert_eq!(handle.try_outcome(), Some(Outcome::Fulfilled(7)));
    }

    #[test]
    fn block_on_stalled_future_errors() {
        let mut rt = Runtime::new();
        let result = rt.block_on(NeverComplete);
        assert_eq!(result, Err(RunError::Stalled));
    }

    #[test]
    fn busy_task_trips_step_limit() {
        let mut rt = Runtime::with_config(RuntimeConfig {
            max_steps: Some(16),
        });
        let result = rt.block_on(BusyYield);
        assert_eq!(result, Err(RunError::StepLimitExceeded { steps: 16 }));
    }
}
