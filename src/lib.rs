//! Conjoin: wait-for-all, fail-on-first-failure, deterministically.
//!
//! # Overview
//!
//! Conjoin provides a single combinator, [`all`], over tasks running on a
//! deterministic, single-threaded, virtual-time runtime. `all` waits for
//! every task to fulfill and yields their values in input order; the
//! moment any task rejects, it settles with that first rejection instead,
//! ordered by completion time rather than input position.
//!
//! # Core Guarantees
//!
//! - **Input-order values**: a fulfilled settlement carries one value per
//!   input task, in input order, regardless of completion order
//! - **First rejection by time wins**: the earliest-completing rejection
//!   settles the combinator; ties within one scheduling tick resolve to
//!   the lowest input index
//! - **Exactly-once settlement**: a settled result is terminal; later
//!   completions are observed but never alter it
//! - **No cancellation**: tasks still pending at settlement keep running
//!   to their own completion
//! - **Deterministic execution**: FIFO scheduling and a virtual clock that
//!   advances only at idle make every run reproducible
//!
//! # Module Structure
//!
//! - [`types`]: Core types (task ids, virtual instants, outcomes)
//! - [`combinator`]: The `all` combinator and outcome aggregation
//! - [`runtime`]: Deterministic executor, task handles, configuration
//! - [`time`]: Virtual-time sleep
//! - [`error`]: Runtime error types
//!
//! # Example
//!
//! ```
//! use conjoin::{all, Runtime};
//! use std::time::Duration;
//!
//! let mut rt = Runtime::new();
//! let timer = rt.handle();
//!
//! let a = rt.spawn(async { Ok::<_, String>(1) });
//! let t = timer.clone();
//! let b = rt.spawn(async move {
//!     t.sleep(Duration::from_millis(1000)).await;
//!     Err::<i32, _>("p2 error".to_string())
//! });
//! let c = rt.spawn(async move {
//!     timer.sleep(Duration::from_millis(500)).await;
//!     Err::<i32, _>("p3 error".to_string())
//! });
//!
//! let settled = rt.block_on(all(vec![a, b, c])).unwrap();
//! assert_eq!(settled.unwrap_err().reason, "p3 error");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod combinator;
pub mod error;
pub mod runtime;
pub mod time;
pub mod types;

pub use combinator::{all, settle_outcomes, All, AllResult, Rejection};
pub use error::RunError;
pub use runtime::{Runtime, RuntimeConfig, RuntimeHandle, TaskHandle};
pub use time::Sleep;
pub use types::{Outcome, TaskId, Time};
