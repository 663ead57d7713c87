//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `ADMIN_LIVE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use admin_live::config::LiveConfig;
//!
//! let config = LiveConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Connecting to {}", config.connection.endpoint);
//! ```

mod connection;
mod error;
mod feed;
mod logging;

pub use connection::ConnectionConfig;
pub use error::{ConfigError, ValidationError};
pub use feed::{FeedConfig, FeedKind};
pub use logging::LoggingConfig;

use serde::Deserialize;

/// Root configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LiveConfig {
    /// Endpoint, identity and resilience settings
    pub connection: ConnectionConfig,

    /// Tracing output
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Channel variant for the diagnostic binary
    #[serde(default)]
    pub feed: FeedConfig,
}

impl LiveConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ADMIN_LIVE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ADMIN_LIVE__CONNECTION__ENDPOINT=wss://...` -> `connection.endpoint`
    /// - `ADMIN_LIVE__CONNECTION__MAX_RECONNECT_ATTEMPTS=5` -> `connection.max_reconnect_attempts`
    /// - `ADMIN_LIVE__FEED__KIND=escalation` -> `feed.kind`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ADMIN_LIVE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.connection.validate()?;
        self.feed.validate()?;
        Ok(())
    }
}
