//! Error types for collstore
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! There is no "not found" error: lookups signal absence with `Option` or
//! `bool`.

use std::io;
use thiserror::Error;

/// Result type alias for collstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for collstore
#[derive(Debug, Error)]
pub enum Error {
    /// Caller supplied an unusable argument (bad collection name, reserved
    /// field, non-object field map). Never retryable.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Build an `InvalidArgument` error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Build a `Config` error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// True for errors caused by caller input
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_argument() {
        let err = Error::invalid_argument("collection name must not be empty");
        let msg = err.to_string();
        assert!(msg.contains("Invalid argument"));
        assert!(msg.contains("must not be empty"));
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::config("unknown log format 'xml'");
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("xml"));
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let result: Result<serde_json::Value> =
            serde_json::from_str("{not json").map_err(Error::from);
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
