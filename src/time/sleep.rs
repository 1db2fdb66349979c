//! Sleep future for delaying execution on the virtual clock.

use crate::runtime::RuntimeHandle;
use crate::types::Time;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future that completes once the virtual clock reaches its deadline.
///
/// Created by [`RuntimeHandle::sleep`] and [`RuntimeHandle::sleep_until`].
/// Each poll checks the clock; while the deadline is in the future, the
/// task's waker is registered with the runtime's timer queue.
///
/// # Cancel safety
///
/// Dropping a `Sleep` just stops the wait. A timer registered for it may
/// still fire, which wakes the owning task once more with no other effect.
#[derive(Debug)]
pub struct Sleep {
    handle: RuntimeHandle,
    deadline: Time,
}

impl Sleep {
    pub(crate) fn new(handle: RuntimeHandle, deadline: Time) -> Self {
        Self { handle, deadline }
    }

    /// Returns the deadline for this sleep.
    #[must_use]
    pub const fn deadline(&self) -> Time {
        self.deadline
    }

    /// Returns true if the deadline has passed.
    #[must_use]
    pub fn is_elapsed(&self) -> bool {
        self.handle.now() >= self.deadline
    }
}

impl Future for Sleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.is_elapsed() {
            Poll::Ready(())
        } else {
            self.handle.register_timer(self.deadline, cx.waker().clone());
            Poll::Pending
        }
    }
}
