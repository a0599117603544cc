//! Test utilities for scriptdeps
//!
//! Helpers shared by unit tests and, through the `test-utils` feature, by the
//! integration tests under `tests/`:
//! - Once-only tracing setup that writes through the test harness
//! - [`ScriptFixture`] sample script trees, usable in memory or on disk
//!
//! # Example
//!
//! ```rust,no_run
//! use scriptdeps_cli::resolver::{ResolverOptions, ScriptResolver};
//! use scriptdeps_cli::test_utils::{ScriptFixture, init_test_logging};
//!
//! init_test_logging(None);
//! let fixture = ScriptFixture::widget_app();
//! let resolver = ScriptResolver::new(fixture.memory_source(), ResolverOptions::default());
//! let resolution = resolver.resolve(["app.js"]);
//! assert!(resolution.is_clean());
//! ```

pub mod fixtures;

pub use fixtures::ScriptFixture;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. `RUST_LOG` is used when `level` is
/// `None`; with neither, tests run without a subscriber.
///
/// ```bash
/// RUST_LOG=scriptdeps_cli=trace cargo test
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
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
