//! Logging setup with the service's default filter.
//!
//! Installs the global subscriber, so it lives in its own test binary.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use common::logging::init_logging;
use std::path::Path;
use tracing::Level;
use noop_webhook::config::DEFAULT_LOG_FILTER;

#[test]
fn test_default_filter_keeps_shared_crate_events() {
    // A regular file stands where the log directory should be.
    let unopenable = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("Cargo.toml")
        .join("app.log");

    let guard = init_logging(DEFAULT_LOG_FILTER, Some(&unopenable)).unwrap();

    assert!(!guard.file_logging_enabled());
    // The console fallback warning and shutdown messages come from `common`.
    assert!(tracing::enabled!(target: "common::logging", Level::WARN));
    assert!(tracing::enabled!(target: "common::shutdown", Level::INFO));
    assert!(tracing::enabled!(target: "noop_webhook::handlers", Level::INFO));
    assert!(!tracing::enabled!(target: "noop_webhook::handlers", Level::DEBUG));
}
