//! Runtime configuration.

/// Configuration for a [`Runtime`](super::Runtime).
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Maximum number of polls per driving call (`run_until_quiescent`,
    /// `run_ready`, `block_on`). `None` disables the guard.
    ///
    /// This is a runaway-poll circuit breaker: a task that wakes itself in
    /// a tight loop would otherwise spin the executor forever.
    pub max_steps: Option<u64>,
}

impl RuntimeConfig {
    /// Default step budget per driving call.
    pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

    /// Configuration with no step limit.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self { max_steps: None }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_steps: Some(Self::DEFAULT_MAX_STEPS),
        }
    }
}
