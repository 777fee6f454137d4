//! Logging setup for the command-line tools.

use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CAIRN_LOG";

/// Installs a stderr subscriber.
///
/// The filter is read from `CAIRN_LOG`; `default_filter` applies when it is
/// unset or invalid.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
