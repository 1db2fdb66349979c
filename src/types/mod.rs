//! Core types: identifiers, virtual instants, and terminal outcomes.

mod id;
mod outcome;

pub use id::{TaskId, Time};
pub use outcome::Outcome;
