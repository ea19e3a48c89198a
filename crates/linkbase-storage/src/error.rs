//! Storage error types

use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Storage-specific error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Row not found after write: {0}")]
    MissingAfterWrite(String),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] ::rusqlite::Error),
}

impl From<StorageError> for linkbase_core::Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::MissingAfterWrite(what) => linkbase_core::Error::NotCreated(what),
            other => linkbase_core::Error::Storage(other.to_string()),
        }
    }
}
