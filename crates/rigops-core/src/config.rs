//! Configuration
//!
//! Defines the runtime knobs of the submission core:
//! - Completion tracker retry budget and feed window
//! - Request queue concurrency and transport retry policy
//! - Log filter and format

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RigopsConfig {
    /// Completion tracker settings
    pub tracker: TrackerConfig,
    /// Transport and request queue settings
    pub transport: TransportConfig,
    /// Logging settings
    pub telemetry: TelemetryConfig,
}

impl RigopsConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With tracker retry delay
    #[inline]
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.tracker.retry_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With per-route concurrency limit
    #[inline]
    #[must_use]
    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.transport.max_in_flight_per_route = max;
        self
    }

    /// Parse a TOML document; missing fields keep their defaults
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the document does not parse or fails
    /// [`RigopsConfig::validate`].
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for a zero feed limit or zero
    /// per-route concurrency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracker.feed_limit == 0 {
            return Err(ConfigError::Invalid("tracker.feed_limit must be > 0".into()));
        }
        if self.transport.max_in_flight_per_route == 0 {
            return Err(ConfigError::Invalid(
                "transport.max_in_flight_per_route must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Completion tracker settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds
    pub retry_delay_ms: u64,
    /// Size of the recently-completed window requested per poll
    pub feed_limit: usize,
}

impl TrackerConfig {
    /// Total attempts including the first
    #[inline]
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay between attempts
    #[inline]
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay_ms: 3_000,
            feed_limit: 100,
        }
    }
}

/// Transport and request queue settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Concurrent requests allowed per route
    pub max_in_flight_per_route: usize,
    /// Transport-level retries for retryable errors
    pub max_transport_retries: u32,
    /// Fixed delay between transport retries in milliseconds
    pub transport_retry_delay_ms: u64,
}

impl TransportConfig {
    /// Delay between transport retries
    #[inline]
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.transport_retry_delay_ms)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_in_flight_per_route: 4,
            max_transport_retries: 2,
            transport_retry_delay_ms: 500,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}
