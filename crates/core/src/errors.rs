//! Error types shared across the mirror sync crates.

use thiserror::Error;

/// Result type alias used throughout the core.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error for sync operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Local storage failure.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Remote CRM API failure.
    #[error("Remote API error: {0}")]
    Remote(#[from] RemoteError),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No stored credentials for the requested location.
    #[error("No credentials found for location: {0}")]
    MissingCredentials(String),
}

/// Storage-layer failures, reported by the storage crate.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("{0}")]
    Internal(String),
}

/// Remote API failures, reported by the client crate.
///
/// A `Status`/`Transport` error during a page fetch is fatal for the whole
/// pass; the same error during per-record enrichment is logged and skipped
/// by the sync services.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected payload: {0}")]
    Payload(String),

    #[error("authentication failure: {0}")]
    Auth(String),
}

impl Error {
    /// HTTP status if this wraps a remote status error.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Self::Remote(RemoteError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
