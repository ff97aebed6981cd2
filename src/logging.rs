use miette::{miette, Result};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";


/// Builds the console filter from `RUST_LOG`, falling back to [`DEFAULT_LOG_FILTER`].
pub fn console_output_level_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}


/// Installs the global tracing subscriber.
///
/// Output goes to stderr so that utility modes keep stdout clean for their
/// own output.
pub fn initialize_tracing(console_level_filter: EnvFilter) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(console_level_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| miette!("Failed to initialize tracing subscriber: {error}"))
}
