use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize logging with tracing
///
/// Reads the filter from the RUST_LOG environment variable if available,
/// falling back to "livecap=debug,warn".
///
/// # Example
///
/// ```no_run
/// use livecap::utils::logging::init_logging;
///
/// init_logging();
/// ```
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("livecap=debug,warn"));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    tracing::info!("LiveCap logging initialized");
}
