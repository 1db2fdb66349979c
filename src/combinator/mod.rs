//! Combinators aggregating task outcomes.
//!
//! - [`all`]: wait for all tasks, settle with values in input order, or
//!   fail with the first rejection by completion time.

pub mod all;

pub use all::{all, settle_outcomes, All, AllResult, Rejection};
