//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values use the `ACCORD` prefix with
//! `__` (double underscore) separating nested keys:
//!
//! - `ACCORD__SERVER__PORT=8080` -> `server.port = 8080`
//! - `ACCORD__DATABASE__URL=...` -> `database.url = ...`

mod database;
mod error;
mod server;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ConfigValidationError};
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment).
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection).
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file first when present (development), then reads
    /// `ACCORD__`-prefixed variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when required variables are missing or
    /// values cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ACCORD")
                    .separator("__"),
            )
            .build()
            .map_err(ConfigError::Load)?;

        config.try_deserialize().map_err(ConfigError::Load)
    }

    /// Validate the loaded configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        Ok(())
    }
}
