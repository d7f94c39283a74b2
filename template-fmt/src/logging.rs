//! Diagnostic tracing for the formatter.
//!
//! Progress and results are printed to stdout by the CLI. This module only
//! covers developer diagnostics, which go to stderr and are off below `warn`
//! unless `RUST_LOG` says otherwise.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=template_fmt=debug template-fmt --apply-changes
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
