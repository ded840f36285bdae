//! Salvage Content Store
//!
//! Read access to the hosted structured-content platform. The [`ContentStore`]
//! trait bundles the query ports defined in `salvage-core`; implementations talk
//! to the hosted HTTP query API or keep documents in memory.

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

use salvage_core::{CategoryGraphSource, CategoryQueries, CoreError, DashboardQueries};

/// Errors that can occur while querying the content store
#[derive(Error, Debug)]
pub enum ContentStoreError {
    #[error("Storage backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Catch-all for backend-specific issues

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Content store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for content store operations
pub type ContentStoreResult<T> = Result<T, ContentStoreError>;

impl From<ContentStoreError> for CoreError {
    fn from(err: ContentStoreError) -> Self {
        match err {
            ContentStoreError::SerializationError(e) => CoreError::SerializationError(e.to_string()),
            ContentStoreError::ConfigurationError(msg) => CoreError::ConfigurationError(msg),
            other => CoreError::QueryError(other.to_string()),
        }
    }
}

/// A content store answering every query port
#[async_trait]
pub trait ContentStore: CategoryGraphSource + CategoryQueries + DashboardQueries + Debug {
    /// Check that the store answers queries
    async fn ping(&self) -> ContentStoreResult<()>;

    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;
}

/// One store handed out as each of the ports
#[derive(Clone)]
pub struct ContentPorts {
    /// The store itself
    pub store: Arc<dyn ContentStore>,
    /// Category graph snapshots
    pub graph: Arc<dyn CategoryGraphSource>,
    /// Blog taxonomy
    pub categories: Arc<dyn CategoryQueries>,
    /// Dashboard queries
    pub dashboard: Arc<dyn DashboardQueries>,
}

impl ContentPorts {
    /// Share one store across all ports
    pub fn from_store<S: ContentStore + 'static>(store: Arc<S>) -> Self {
        Self {
            graph: store.clone(),
            categories: store.clone(),
            dashboard: store.clone(),
            store,
        }
    }
}

impl Debug for ContentPorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentPorts")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

// Re-export modules so they can be used from other crates
pub mod memory;
pub mod queries;
pub mod sanity;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: CoreError = ContentStoreError::Unavailable("offline".to_string()).into();
        assert!(err.is_infrastructure());
        assert_eq!(err.to_string(), "Content query error: Content store unavailable: offline");

        let err: CoreError = ContentStoreError::ConfigurationError("no dataset".to_string()).into();
        assert_eq!(err, CoreError::ConfigurationError("no dataset".to_string()));
    }
}
