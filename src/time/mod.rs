//! Virtual-time primitives.

mod sleep;

pub use sleep::Sleep;
