//! Bookshelf - Books CRUD Service
//!
//! This crate provides a small books CRUD web service with a configurable
//! relational storage backend. It can be used as a library by other Rust
//! projects, or run as a standalone binary with the `bookshelf` executable.
//!
//! # Architecture
//!
//! - **Storage**: the [`BookStore`] port with PostgreSQL and MySQL backends,
//!   selected by name through a process-wide [`StoreRegistry`]
//! - **Server**: axum HTTP API over the storage port
//! - **Config**: YAML configuration with env-var expansion and validation
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bookshelf::config::AppConfig;
//! use bookshelf::server::{create_router, AppState};
//! use bookshelf::storage::StoreRegistry;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load("configs/config.yaml")?;
//! let registry = Arc::new(StoreRegistry::from_config(&config.database));
//! let state = AppState::new(registry, config.database.backend.as_ref());
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod server;
pub mod storage;

pub use config::AppConfig;
pub use server::{create_router, AppState};
pub use storage::{
    BackendKind, Book, BookFilter, BookPatch, BookStore, HealthReport, HealthStatus, MySqlStore,
    NewBook, PostgresStore, StorageError, StoreRegistry,
};
