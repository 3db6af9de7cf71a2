//! Error types for curio_core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using curio_core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during image-store and catalog operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Image source stream could not be read.
    #[error("Image source unavailable: {reason}")]
    SourceUnavailable { reason: String },

    /// Artifact could not be durably stored.
    #[error("Failed to persist artifact at {path}: {reason}")]
    PersistFailure { path: PathBuf, reason: String },

    /// Catalog backing store is unreachable or a query failed.
    #[error("Catalog store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// Point lookup on a nonexistent item identifier.
    #[error("Item not found: {id}")]
    NotFound { id: i64 },

    /// Malformed identifier, reference or missing required field.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl Error {
    /// Create a SourceUnavailable error.
    pub fn source_unavailable(reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a PersistFailure error.
    pub fn persist_failure(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::PersistFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a StoreUnavailable error.
    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Error::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a NotFound error.
    pub fn not_found(id: i64) -> Self {
        Error::NotFound { id }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether the caller, rather than the store, caused this error.
    ///
    /// The boundary layer maps client errors to 4xx-style responses and
    /// everything else to 5xx-style responses.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::InvalidInput { .. })
    }
}

// Additional From implementations for external error types

impl From<r2d2::Error> for Error {
    fn from(err: r2d2::Error) -> Self {
        Error::store_unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_server_split() {
        assert!(Error::not_found(7).is_client_error());
        assert!(Error::invalid_input("missing name").is_client_error());
        assert!(!Error::source_unavailable("broken pipe").is_client_error());
        assert!(!Error::persist_failure("/tmp/x", "disk full").is_client_error());
        assert!(!Error::store_unavailable("locked").is_client_error());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::not_found(42);
        assert_eq!(err.to_string(), "Item not found: 42");

        let err = Error::invalid_input("keyword missing");
        assert!(err.to_string().contains("keyword missing"));
    }
}
