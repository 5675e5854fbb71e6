//! Test Telemetry
//!
//! Tracing initialization for test binaries. Tests in one binary race to
//! install the global subscriber, so initialization runs behind a
//! `once_cell` guard and later calls are no-ops.

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // try_init: another subscriber may already be installed by the harness.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Installs the test tracing subscriber once per test binary
///
/// Respects `RUST_LOG` when set; defaults to `info` otherwise. Output goes
/// through the test writer so it is captured per test.
pub fn init_tracing() {
    Lazy::force(&TRACING);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
        tracing::info!("telemetry initialized twice without panicking");
    }
}
