//! Storage-layer error type and its mapping into the core taxonomy.

use leadmirror_core::errors::DatabaseError;
use thiserror::Error;

/// Errors raised while talking to SQLite.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection pool exhausted or unavailable
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Failed to open the database
    #[error("Connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),

    /// Query execution failure
    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),

    /// Embedded migration failure
    #[error("Migration error: {0}")]
    Migration(String),

    /// Anything else (actor channel, serialization of stored blobs)
    #[error("{0}")]
    Internal(String),
}

impl From<StorageError> for leadmirror_core::Error {
    fn from(err: StorageError) -> Self {
        let db = match err {
            StorageError::Pool(e) => DatabaseError::Pool(e.to_string()),
            StorageError::Connection(e) => DatabaseError::Connection(e.to_string()),
            StorageError::Query(e) => DatabaseError::Query(e.to_string()),
            StorageError::Migration(msg) => DatabaseError::Migration(msg),
            StorageError::Internal(msg) => DatabaseError::Internal(msg),
        };
        leadmirror_core::Error::Database(db)
    }
}
