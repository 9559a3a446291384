//! Database configuration

use serde::Deserialize;

use super::error::ConfigValidationError;

/// PostgreSQL connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL (postgres://...)
    pub url: String,

    /// Maximum pool connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ConfigValidationError::InvalidDatabaseUrl);
        }
        if self.max_connections == 0 {
            return Err(ConfigValidationError::InvalidPoolSize);
        }
        Ok(())
    }
}

fn default_max_connections() -> u32 {
    10
}
