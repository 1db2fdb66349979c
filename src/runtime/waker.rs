//! Waker implementation for the deterministic executor.

use super::runtime::Inner;
use crate::types::TaskId;
use std::sync::Arc;
use std::task::Wake;

/// Waker that re-enqueues its task on the run queue.
///
/// Waking an already-queued or already-completed task is harmless: the
/// executor skips ids with no stored future, and a spurious extra poll of a
/// pending task just returns `Pending` again.
pub(crate) struct TaskWaker {
    pub(crate) task_id: TaskId,
    pub(crate) inner: Arc<Inner>,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref();
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.inner
            .run_queue
            .lock()
            .expect("run queue lock poisoned")
            .push(self.task_id);
    }
}
