//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(String),

    #[error("Endpoint scheme must be ws or wss, got '{0}'")]
    UnsupportedScheme(String),

    #[error("Configuration value must be greater than zero: {0}")]
    NotPositive(&'static str),

    #[error("Invalid subscription id list: {0}")]
    InvalidSubscription(String),
}
