//! Configuration error types

use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Errors raised while validating loaded configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("Server port must be non-zero")]
    InvalidPort,

    #[error("Request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("Database URL must be a postgres:// URL")]
    InvalidDatabaseUrl,

    #[error("Database pool size must be non-zero")]
    InvalidPoolSize,
}
