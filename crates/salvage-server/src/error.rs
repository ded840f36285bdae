//! Error types for the Salvage Server
//!
//! This module contains the error types used throughout the server.

use salvage_content_store::ContentStoreError;
use salvage_core::CoreError;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Unauthorized error
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Content store error
    #[error("Content store error: {0}")]
    ContentStoreError(String),

    /// The email provider refused or could not be reached
    #[error("Email delivery error: {0}")]
    EmailDeliveryError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

// Implement conversions from other error types
impl From<ContentStoreError> for ServerError {
    fn from(err: ContentStoreError) -> Self {
        match err {
            ContentStoreError::ConfigurationError(msg) => ServerError::ConfigurationError(msg),
            _ => ServerError::ContentStoreError(format!("{}", err)),
        }
    }
}

impl From<CoreError> for ServerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DocumentNotFound(id) => ServerError::NotFound(format!("Document {}", id)),
            CoreError::ValidationError(msg) => ServerError::ValidationError(msg),
            CoreError::ConfigurationError(msg) => ServerError::ConfigurationError(msg),
            CoreError::QueryError(msg) | CoreError::SerializationError(msg) => {
                ServerError::ContentStoreError(msg)
            }
            other => ServerError::InternalError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::ValidationError(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(err: reqwest::Error) -> Self {
        ServerError::EmailDeliveryError(format!("HTTP request error: {}", err))
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::InternalError(format!("IO error: {}", err))
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(format!("Error: {}", err))
    }
}

impl ServerError {
    /// Whether an upstream dependency caused the failure
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            ServerError::ContentStoreError(_) | ServerError::EmailDeliveryError(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_conversion() {
        let err: ServerError = CoreError::QueryError("timeout".to_string()).into();
        assert!(matches!(err, ServerError::ContentStoreError(_)));
        assert!(err.is_upstream_error());

        let err: ServerError = CoreError::ValidationError("Unknown sort field: x".to_string()).into();
        assert_eq!(err.to_string(), "Validation error: Unknown sort field: x");
        assert!(!err.is_upstream_error());
    }

    #[test]
    fn test_content_store_error_conversion() {
        let err: ServerError = ContentStoreError::Unavailable("offline".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Content store error: Content store unavailable: offline"
        );
    }
}
