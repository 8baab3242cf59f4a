//! Log subscriber installation for acceptance-test runs.
//!
//! The library emits `tracing` events at run, step, and cleanup boundaries.
//! Test binaries call [`try_init`] to see them; output goes through the test
//! writer so `cargo test` captures it per test.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// the configured level.
///
/// Returns `false` when a subscriber was already installed, which is the
/// normal case for every test after the first in a binary.
#[must_use]
pub fn try_init(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init()
        .is_ok()
}
