//! Test utilities for depforge
//!
//! Shared by unit tests and, through the `test-utils` feature, by the
//! integration suite.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. `level` wins over `RUST_LOG`; with
/// neither set, tests run silently.
///
/// ```rust,no_run
/// depforge::test_utils::init_test_logging(None);
/// depforge::test_utils::init_test_logging(Some(tracing::Level::DEBUG));
/// ```
///
/// ```bash
/// RUST_LOG=installer=debug,exec=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true) // Show targets like "exec" and "installer"
            .with_thread_ids(false)
            .try_init();
    });
}

/// Writes an executable shell script at `path`.
#[cfg(unix)]
pub fn write_script(path: &std::path::Path, body: &str) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, format!("#!/bin/sh\n{body}"))?;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)
}
