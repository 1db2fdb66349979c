//! Two-valued terminal outcome type.
//!
//! Every task produces exactly one [`Outcome`]:
//!
//! - `Fulfilled(T)`: success with a value
//! - `Rejected(E)`: failure with an opaque, caller-defined reason
//!
//! Both variants are terminal. There is no pending variant here: a task that
//! has not settled yet simply has no outcome in its completion slot.

use core::fmt;

/// The terminal outcome of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<T, E> {
    /// The task succeeded with a value.
    Fulfilled(T),
    /// The task failed with a reason.
    Rejected(E),
}

impl<T, E> Outcome<T, E> {
    /// Returns true if this outcome is `Fulfilled`.
    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// Returns true if this outcome is `Rejected`.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Returns the fulfilled value, if any.
    pub fn fulfilled(self) -> Option<T> {
        match self {
            Self::Fulfilled(v) => Some(v),
            Self::Rejected(_) => None,
        }
    }

    /// Returns the rejection reason, if any.
    pub fn rejected(self) -> Option<E> {
        match self {
            Self::Fulfilled(_) => None,
            Self::Rejected(e) => Some(e),
        }
    }

    /// Maps the fulfilled value, leaving a rejection untouched.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U, E> {
        match self {
            Self::Fulfilled(v) => Outcome::Fulfilled(f(v)),
            Self::Rejected(e) => Outcome::Rejected(e),
        }
    }

    /// Maps the rejection reason, leaving a fulfilled value untouched.
    pub fn map_rejected<F2, F: FnOnce(E) -> F2>(self, f: F) -> Outcome<T, F2> {
        match self {
            Self::Fulfilled(v) => Outcome::Fulfilled(v),
            Self::Rejected(e) => Outcome::Rejected(f(e)),
        }
    }

    /// Converts into a `Result`.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Fulfilled(v) => Ok(v),
            Self::Rejected(e) => Err(e),
        }
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Fulfilled(v),
            Err(e) => Self::Rejected(e),
        }
    }
}

impl<T: fmt::Display, E: fmt::Display> fmt::Display for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fulfilled(v) => write!(f, "fulfilled: {v}"),
            Self::Rejected(e) => write!(f, "rejected: {e}"),
        }
    }
}
