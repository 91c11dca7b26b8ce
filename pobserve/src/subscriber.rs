//! Global `tracing` subscriber installation.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const ENV_LOG_FILTER: &str = "PARLEY_LOG";
pub const DEFAULT_LOG_FILTER: &str = "info";

/// `PARLEY_LOG` when set and valid, otherwise `default_filter`, otherwise `info`.
pub fn log_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(ENV_LOG_FILTER)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs a fmt subscriber. Returns `false` when a global subscriber was
/// already set, which leaves the existing one in place.
pub fn init_tracing(default_filter: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(default_filter))
        .with_target(true)
        .try_init()
        .is_ok()
}
