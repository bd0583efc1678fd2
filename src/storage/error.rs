//! Storage-specific error types.
//!
//! All storage operations return [`StorageError`] on failure, which can be
//! matched to determine the underlying cause (missing row, constraint
//! violation, unreachable backend, etc.).

use thiserror::Error;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend name is not present in the registry.
    #[error("unknown backend '{0}'")]
    UnknownBackend(String),

    /// No row matches the requested identifier.
    #[error("book not found")]
    NotFound,

    /// The backend rejected a write (constraint or type violation).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backend could not be reached (connect failure or timeout).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Any other database error (sqlx error).
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StorageError {
    /// Classify a driver error into the storage taxonomy.
    ///
    /// Constraint violations become [`StorageError::Validation`], connection
    /// and timeout failures become [`StorageError::Unavailable`], a missing
    /// row becomes [`StorageError::NotFound`].
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StorageError::NotFound,
            sqlx::Error::Database(db) => {
                if db.is_unique_violation()
                    || db.is_foreign_key_violation()
                    || db.is_check_violation()
                {
                    StorageError::Validation(db.to_string())
                } else {
                    StorageError::Database(sqlx::Error::Database(db))
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                StorageError::Unavailable(err.to_string())
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => StorageError::Unavailable(err.to_string()),
            other => StorageError::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = StorageError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StorageError::NotFound));
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err = StorageError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StorageError::Unavailable(_)));
    }

    #[test]
    fn test_unknown_backend_message() {
        let err = StorageError::UnknownBackend("oracle".to_string());
        assert_eq!(err.to_string(), "unknown backend 'oracle'");
    }
}
