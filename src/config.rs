//! Configuration module for the bookshelf service.
//!
//! Provides YAML-based configuration loading and validation for:
//! - Server settings (port, bind address)
//! - Database settings (selected backend, per-backend connection URLs,
//!   pool size, acquire timeout)
//!
//! Connection URLs may reference environment variables with
//! `${VAR}` / `${VAR:-default}` syntax; expansion happens before parsing.

mod app;
mod validation;

pub use app::{AppConfig, DatabaseConfig, ServerConfig};
pub use validation::{expand_env_vars, ConfigError};

// Re-export constants
pub use app::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_POOL_SIZE};
