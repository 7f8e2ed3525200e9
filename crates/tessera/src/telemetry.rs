//! # Logging Bootstrap
//!
//! Installs a `tracing-subscriber` formatter for the binary. Libraries in
//! this workspace only emit `tracing` events and never install a subscriber.

use tracing_subscriber::EnvFilter;

use crate::config::{ConfigError, ConfigResult, LoggingConfig};

/// Builds the event filter: `RUST_LOG` when set, the configured directive otherwise.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the configured directive does not parse.
pub fn env_filter(config: &LoggingConfig) -> ConfigResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|error| {
        ConfigError::Invalid(format!("logging.filter {:?}: {error}", config.filter))
    })
}

/// Installs the global formatter.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case that one keeps receiving events.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the configured directive does not parse.
pub fn init_logging(config: &LoggingConfig) -> ConfigResult<bool> {
    let filter = env_filter(config)?;
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok())
}
