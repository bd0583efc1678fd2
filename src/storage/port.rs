//! The storage port: the contract every backend must satisfy.

use async_trait::async_trait;
use uuid::Uuid;

use crate::storage::types::{Book, BookFilter, BookPatch, HealthReport, NewBook};
use crate::storage::StorageError;

/// How a backend matches title/author fragments in [`BookStore::search`].
///
/// This divergence is a documented per-backend trait, not something the port
/// papers over: Postgres matches case-insensitively (`ILIKE`), MySQL
/// case-sensitively (`LIKE BINARY`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentMatching {
    /// Substring match ignoring letter case.
    CaseInsensitive,
    /// Substring match honoring letter case.
    CaseSensitive,
}

/// Abstract contract for a book storage backend.
///
/// All operations are single logical units of work against the backing
/// database; concurrent calls on the same id rely on the database's own
/// row-level locking. Implementations must not retry internally: failures
/// surface as [`StorageError`] and resilience belongs to the caller.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Backend name, matching its registry key (e.g. "postgres").
    fn name(&self) -> &str;

    /// Advertised fragment-matching semantics for [`BookStore::search`].
    fn fragment_matching(&self) -> FragmentMatching;

    /// Persist a new book and return it with its generated identifier.
    async fn create(&self, book: NewBook) -> Result<Book, StorageError>;

    /// Fetch one book by id. Returns [`StorageError::NotFound`] when absent.
    async fn get(&self, id: Uuid) -> Result<Book, StorageError>;

    /// Fetch books ordered by creation time (newest first, id as tiebreaker).
    ///
    /// `offset` skips leading rows, `limit` bounds the result count. An
    /// out-of-range offset yields an empty vec, never an error.
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Book>, StorageError>;

    /// Search by optional title fragment, author fragment, and exact year.
    ///
    /// Filters are AND-combined; with no filters set this is equivalent to an
    /// unpaginated [`BookStore::list`]. Fragment semantics are per-backend,
    /// see [`BookStore::fragment_matching`].
    async fn search(&self, filter: &BookFilter) -> Result<Vec<Book>, StorageError>;

    /// Apply a partial update and return the resulting row.
    ///
    /// Fields left unset in the patch keep their prior value; an empty patch
    /// returns the current row unchanged. Returns [`StorageError::NotFound`]
    /// when the id is absent.
    async fn update(&self, id: Uuid, patch: BookPatch) -> Result<Book, StorageError>;

    /// Hard-delete one book. Returns [`StorageError::NotFound`] when absent.
    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;

    /// Verify connectivity with a trivial round-trip query.
    ///
    /// Never fails: an unreachable backend yields an unhealthy report.
    async fn health_check(&self) -> HealthReport;
}
