//! Core data types for the storage layer.
//!
//! This module defines the primary data structures used throughout the storage layer:
//!
//! - [`Book`]: the persisted book record
//! - [`NewBook`] / [`BookPatch`] / [`BookFilter`]: operation payloads
//! - [`BackendKind`]: the enumerated set of built-in backends
//! - [`HealthReport`] / [`HealthStatus`]: connectivity check results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

/// A book record stored in the `book` table.
///
/// The identifier is generated at creation time and never changes. Postgres
/// persists it as a native `UUID` column, MySQL as `CHAR(36)`; both carry the
/// same UUIDv4 value, so the in-memory representation is uniform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Unique identifier, assigned by the backend on create.
    pub id: Uuid,
    /// Book title.
    pub title: String,
    /// Book author.
    pub author: String,
    /// Publication year. No range is enforced at this layer.
    pub year: i32,
    /// Creation timestamp (UTC), assigned by the database.
    pub created_on: DateTime<Utc>,
}

/// Payload for creating a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    /// Book title.
    pub title: String,
    /// Book author.
    pub author: String,
    /// Publication year.
    pub year: i32,
}

/// Partial update for a book. Fields left as `None` keep their prior value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPatch {
    /// New title, if changing.
    pub title: Option<String>,
    /// New author, if changing.
    pub author: Option<String>,
    /// New publication year, if changing.
    pub year: Option<i32>,
}

impl BookPatch {
    /// Whether the patch changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none()
    }
}

/// Search filters, AND-combined when present.
///
/// `title` and `author` are substring fragments; how they match (case
/// sensitivity) is a per-backend trait, see
/// [`BookStore::fragment_matching`](crate::storage::BookStore::fragment_matching).
/// `year` is an exact match.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Title fragment.
    pub title: Option<String>,
    /// Author fragment.
    pub author: Option<String>,
    /// Exact publication year.
    pub year: Option<i32>,
}

impl BookFilter {
    /// Whether any filter is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none()
    }
}

/// Built-in backend identifiers.
///
/// These are the names registered by
/// [`StoreRegistry::from_config`](crate::storage::StoreRegistry::from_config)
/// and the accepted values for the `database.backend` configuration key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BackendKind {
    /// PostgreSQL backend (native UUID keys, case-insensitive search).
    Postgres,
    /// MySQL backend (CHAR(36) keys, case-sensitive search).
    Mysql,
}

/// Outcome of a backend connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status")]
pub enum HealthStatus {
    /// Round-trip query succeeded.
    Healthy,
    /// Round-trip query failed.
    Unhealthy {
        /// Driver-supplied failure detail.
        reason: String,
    },
}

impl HealthStatus {
    /// Whether the backend answered the probe.
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Health check result for one backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Backend name that served the probe.
    pub backend: String,
    /// Probe outcome.
    #[serde(flatten)]
    pub status: HealthStatus,
    /// When the probe ran (UTC).
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    /// Build a healthy report for `backend`, stamped now.
    pub fn healthy(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            status: HealthStatus::Healthy,
            checked_at: Utc::now(),
        }
    }

    /// Build an unhealthy report for `backend`, stamped now.
    pub fn unhealthy(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            status: HealthStatus::Unhealthy {
                reason: reason.into(),
            },
            checked_at: Utc::now(),
        }
    }
}
