// src/logging.rs
// =============================================================================
// Sets up tracing for the whole process.
//
// Logs go to stderr so that `--json` output on stdout stays machine-readable.
// The filter uses EnvFilter syntax, e.g. "info" or "repo_scout=debug".
// =============================================================================

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging(filter: &str) {
    let filter_layer = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .with(filter_layer)
        .init();

    tracing::debug!(filter, "logging initialised");
}
