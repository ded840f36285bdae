//!
//! Salvage Server - HTTP service for the Salvage back-office
//!
//! This module exports all the components of the Salvage Server.

// External dependencies
use std::sync::Arc;

use salvage_content_store::memory::InMemoryContentStore;
use salvage_content_store::sanity::{SanityConfig, SanityContentStore};
use salvage_content_store::ContentPorts;

/// API module
pub mod api;

/// Server module
pub mod server;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Outgoing email module
pub mod mail;

// Re-export key types
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use mail::{EmailSender, OutgoingEmail};
pub use server::SalvageServer;

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    // Initialize logging
    init_logging(&config);

    // Create dependencies
    let content = create_content_store(&config)?;
    let mailer = create_mailer(&config)?;

    // Create and run the server
    let server = SalvageServer::new(config, content, mailer)?;
    server.run().await
}

/// Initialize logging
fn init_logging(config: &ServerConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = if config.log_format.eq_ignore_ascii_case("json") {
        fmt().json().with_env_filter(filter).with_target(true).try_init()
    } else {
        fmt().with_env_filter(filter).with_target(true).try_init()
    };

    if result.is_err() {
        tracing::debug!("Logging already initialized");
    }
}

/// Create the content store from `CONTENT_STORE_URL`
pub fn create_content_store(config: &ServerConfig) -> ServerResult<ContentPorts> {
    let url = config.content_store_url.as_str();

    if let Some(name) = url.strip_prefix("memory://") {
        // Use in-memory content store for development and testing
        tracing::info!(name, "Using in-memory content store");
        return Ok(ContentPorts::from_store(Arc::new(InMemoryContentStore::new())));
    }

    if let Some(rest) = url.strip_prefix("sanity://") {
        // Format: sanity://{project_id}/{dataset}?token={token}
        let mut parts = rest.splitn(2, '?');
        let location = parts.next().unwrap_or_default();
        let query = parts.next();

        let mut location_parts = location.splitn(2, '/');
        let project_id = location_parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                ServerError::ConfigurationError("Missing project ID in content store URL".to_string())
            })?;
        let dataset = location_parts
            .next()
            .map(|d| d.trim_end_matches('/'))
            .filter(|d| !d.is_empty())
            .ok_or_else(|| {
                ServerError::ConfigurationError("Missing dataset in content store URL".to_string())
            })?;

        // Token from the query string, falling back to the config
        let token = query
            .and_then(|q| q.split('&').find_map(|pair| pair.strip_prefix("token=")))
            .map(str::to_string)
            .or_else(|| config.content_store_token.clone());

        let mut sanity_config = SanityConfig::new(project_id, dataset);
        sanity_config.api_version = config.content_api_version.clone();
        sanity_config.token = token;
        sanity_config.perspective = config.content_perspective.parse()?;
        sanity_config.use_cdn = config.content_use_cdn;

        tracing::info!(project_id, dataset, "Using hosted content store");
        let store = SanityContentStore::new(sanity_config)?;
        return Ok(ContentPorts::from_store(Arc::new(store)));
    }

    Err(ServerError::ConfigurationError(format!(
        "Unsupported content store URL: {}",
        url
    )))
}

/// Create the email sender
pub fn create_mailer(config: &ServerConfig) -> ServerResult<Arc<dyn EmailSender>> {
    match &config.resend_api_key {
        Some(key) if !key.is_empty() => {
            tracing::info!(api = %config.mail_api_url, "Using email provider");
            Ok(Arc::new(mail::ResendMailer::new(key.clone(), config.mail_api_url.clone())?))
        }
        _ => {
            tracing::warn!("Email delivery disabled");
            Ok(Arc::new(mail::DisabledMailer))
        }
    }
}
