//! Test utilities and fixtures for Boing
//!
//! This crate provides shared test helpers that can be used by both
//! unit tests (#[cfg(test)]) and integration tests (tests/ directory).

pub mod fixtures;
pub mod mocks;

use tracing_subscriber::EnvFilter;

/// Route `tracing` output to the test harness. Controlled by `RUST_LOG`;
/// safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
