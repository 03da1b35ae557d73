//! Test utilities for kwave
//!
//! Logging setup for tests plus document fixtures.
//!
//! # Example
//!
//! ```rust,no_run
//! use kwave_cli::graph::sort_objs;
//! use kwave_cli::test_utils::{BatchFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let waves = sort_objs(BatchFixture::namespaced_app().documents()).unwrap();
//! assert_eq!(waves.len(), 3);
//! ```

pub mod fixtures;

pub use fixtures::{BatchFixture, DocumentBuilder};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honoured when set, and logging stays off when not.
///
/// ```bash
/// RUST_LOG=mutator=debug cargo test
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
            .with_test_writer() // Important: uses test-compatible writer
            .with_target(true) // Show targets like "graph" and "mutator"
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
