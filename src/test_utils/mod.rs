//! Shared helpers for unit tests.

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static LOGGER_INIT: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

/// Installs the test logger once per process. Safe to call from every test.
pub fn enable_logger() {
    *LOGGER_INIT;
    println!("setup logger for unit test.");
}
