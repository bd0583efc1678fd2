//! Application configuration structures.

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::storage::BackendKind;

use super::validation::{expand_env_vars, ConfigError};

// =============================================================================
// Constants
// =============================================================================

/// Default connection pool size per backend.
pub const DEFAULT_POOL_SIZE: u32 = 5;

/// Default connection acquire timeout (30 seconds).
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

fn default_pool_size() -> u32 {
    DEFAULT_POOL_SIZE
}

fn default_acquire_timeout() -> Duration {
    DEFAULT_ACQUIRE_TIMEOUT
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Web server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address (default: "0.0.0.0").
    pub bind: String,

    /// Server port (default: 8080).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

// =============================================================================
// Database Configuration
// =============================================================================

/// Database configuration.
///
/// `backend` selects which store serves requests; a connection URL must be
/// present for the selected backend. URLs for other backends may be omitted,
/// in which case those backends are simply not registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Selected backend ("postgres" or "mysql").
    pub backend: BackendKind,

    /// Postgres connection URL, driver form (e.g. `postgres://user@host/db`).
    #[serde(default)]
    pub postgres_url: Option<String>,

    /// MySQL connection URL, driver form (e.g. `mysql://user@host/db`).
    #[serde(default)]
    pub mysql_url: Option<String>,

    /// Connection pool size per backend (default: 5).
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Connection acquire timeout (default: "30s").
    #[serde(default = "default_acquire_timeout", with = "humantime_serde")]
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// The connection URL configured for `kind`, if any.
    pub fn url_for(&self, kind: BackendKind) -> Option<&str> {
        match kind {
            BackendKind::Postgres => self.postgres_url.as_deref(),
            BackendKind::Mysql => self.mysql_url.as_deref(),
        }
    }
}

// =============================================================================
// Application Configuration
// =============================================================================

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Web server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration.
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    ///
    /// Environment variable references in the file are expanded before
    /// parsing.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&expand_env_vars(&content))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate server bind address
        self.server.bind.parse::<IpAddr>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "invalid server bind address: '{}'",
                self.server.bind
            ))
        })?;

        // Validate server port
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server port must be non-zero".to_string(),
            ));
        }

        // Validate pool size
        if self.database.pool_size == 0 {
            return Err(ConfigError::ValidationError(
                "database pool_size must be positive".to_string(),
            ));
        }

        // The selected backend needs a connection URL
        if self.database.url_for(self.database.backend).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "database backend '{}' selected but no {}_url configured",
                self.database.backend, self.database.backend
            )));
        }

        Ok(())
    }
}
