use thiserror::Error;

/// Core error type for the Salvage domain
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The content store could not answer a query
    #[error("Content query error: {0}")]
    QueryError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Reference error
    #[error("Reference error: {0}")]
    ReferenceError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}

impl CoreError {
    /// Whether the error comes from the content store rather than the input
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, CoreError::QueryError(_) | CoreError::SerializationError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let errors = vec![
            (CoreError::DocumentNotFound("job-1".to_string()), "Document not found: job-1"),
            (CoreError::ValidationError("invalid".to_string()), "Validation error: invalid"),
            (CoreError::QueryError("timeout".to_string()), "Content query error: timeout"),
            (CoreError::SerializationError("bad json".to_string()), "Serialization error: bad json"),
            (CoreError::ConfigurationError("no url".to_string()), "Configuration error: no url"),
            (CoreError::ReferenceError("dangling".to_string()), "Reference error: dangling"),
            (CoreError::Other("plain".to_string()), "plain"),
        ];

        for (error, expected) in errors {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_from_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(CoreError::from(json_err), CoreError::SerializationError(_)));

        assert_eq!(CoreError::from("boom"), CoreError::Other("boom".to_string()));
        assert_eq!(CoreError::from("boom".to_string()), CoreError::Other("boom".to_string()));
    }

    #[test]
    fn test_is_infrastructure() {
        assert!(CoreError::QueryError("down".into()).is_infrastructure());
        assert!(CoreError::SerializationError("bad".into()).is_infrastructure());
        assert!(!CoreError::ValidationError("bad".into()).is_infrastructure());
    }
}
