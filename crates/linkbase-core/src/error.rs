//! Error types for Linkbase Core

use std::time::Duration;

use thiserror::Error;

use crate::limits::ValidationError;

/// Result type alias using Linkbase's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Linkbase error types
///
/// "Entity not found" is deliberately absent: traversal queries report a
/// missing entity through [`crate::QueryOutcome::NotFound`], so callers can
/// tell it apart from a store failure without matching on error variants.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Not created: {0}")]
    NotCreated(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query timed out after {elapsed:?} (limit {limit:?})")]
    TimedOut { elapsed: Duration, limit: Duration },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// True for failures caused by the caller's input rather than the store
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_from() {
        let err: Error = ValidationError::EmptyName.into();
        assert!(err.is_validation());
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_timed_out_display() {
        let err = Error::TimedOut {
            elapsed: Duration::from_millis(1500),
            limit: Duration::from_secs(1),
        };
        assert!(err.to_string().starts_with("Query timed out"));
        assert!(!err.is_validation());
    }
}
