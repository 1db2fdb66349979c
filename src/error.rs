//! Runtime error types.
//!
//! These errors belong to the substrate, not to tasks: a failing task
//! settles with a `Rejected` outcome carrying its opaque reason (see
//! [`crate::combinator::Rejection`]), it never surfaces here.

use thiserror::Error;

/// Errors from driving the runtime.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    /// The runtime went quiescent before the awaited future completed: it
    /// was waiting on something that can never happen.
    #[error("runtime went quiescent before the awaited future settled")]
    Stalled,

    /// The configured step budget was exhausted, usually by a task waking
    /// itself in a tight loop.
    #[error("step limit exceeded after {steps} polls")]
    StepLimitExceeded {
        /// The budget that was exhausted.
        steps: u64,
    },
}
