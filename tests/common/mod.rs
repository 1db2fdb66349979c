//! Shared test setup.

use std::sync::Once;

/// Installs a tracing subscriber once per test binary.
///
/// Verbosity follows `RUST_LOG`; output goes through the test writer so it
/// interleaves with captured test output.
pub fn init_test_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
