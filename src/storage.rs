//! Storage Layer
//!
//! Pluggable relational persistence for book records:
//! - **Port**: the [`BookStore`] trait every backend implements
//! - **Backends**: [`PostgresStore`] (native UUID keys, case-insensitive
//!   search) and [`MySqlStore`] (CHAR(36) keys, case-sensitive search)
//! - **Registry**: [`StoreRegistry`] maps a backend name to a constructor and
//!   caches at most one instance per name
//!
//! Backends are constructed with lazy connection pools; no network I/O
//! happens until the first operation or [`BookStore::health_check`].

mod error;
pub mod mysql;
mod port;
pub mod postgres;
mod query;
mod registry;
mod types;

pub use error::StorageError;
pub use mysql::MySqlStore;
pub use port::{BookStore, FragmentMatching};
pub use postgres::PostgresStore;
pub use registry::{StoreCtor, StoreRegistry};
pub use types::{BackendKind, Book, BookFilter, BookPatch, HealthReport, HealthStatus, NewBook};
