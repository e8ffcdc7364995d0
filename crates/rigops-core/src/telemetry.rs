//! Tracing setup
//!
//! Installs a global `tracing` subscriber for hosts that do not bring their
//! own. `RUST_LOG` overrides the configured filter.

use crate::config::TelemetryConfig;
use crate::error::ConfigError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Build the log filter from `RUST_LOG` or the configured directive
///
/// # Errors
/// Returns [`ConfigError::Invalid`] if the configured directive is malformed.
pub fn env_filter(config: &TelemetryConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter)
        .map_err(|e| ConfigError::Invalid(format!("telemetry.filter: {e}")))
}

/// Install the global subscriber
///
/// Returns `false` if a subscriber was already installed.
///
/// # Errors
/// Returns [`ConfigError::Invalid`] if the configured filter is malformed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<bool, ConfigError> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .try_init()
    };
    Ok(installed.is_ok())
}
