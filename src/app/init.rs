//! Process initialization: logging and the async runtime.

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr so `--dry-run` output on stdout stays machine readable.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // By default, only log from this crate
    // Users can override with RUST_LOG environment variable
    let default = if verbose {
        "kwin_bridge=debug"
    } else {
        "kwin_bridge=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Build the runtime hosting the D-Bus connection and delivery task.
///
/// The bridge core itself is single-threaded and runs inside `block_on`.
pub fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to initialize tokio runtime")
}
