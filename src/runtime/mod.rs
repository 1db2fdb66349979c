//! Deterministic task-scheduling substrate.
//!
//! The runtime is the substrate the combinators observe tasks through:
//!
//! - single-threaded cooperative execution (one poll at a time, FIFO)
//! - exactly one terminal [`Outcome`](crate::types::Outcome) delivered per
//!   task, retained for repeated queries
//! - virtual time that advances only while the run queue is idle, so
//!   completion delivery order is consistent with completion time

mod config;
#[allow(clippy::module_inception)]
mod runtime;
mod scheduler;
pub(crate) mod task;
mod waker;

pub use config::RuntimeConfig;
pub use runtime::{Runtime, RuntimeHandle};
pub use task::TaskHandle;
