//! Configuration for the Salvage Server
//!
//! This module contains the configuration types and loading functionality.

use serde::{Deserialize, Serialize};
use std::env;
use tracing::{info, warn};

use salvage_content_store::sanity::{Perspective, DEFAULT_API_VERSION};
use salvage_core::FailurePolicy;

use crate::error::{ServerError, ServerResult};

/// Server configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Host to bind to
    #[serde(default = "default_host")]
    pub bind_address: String,

    /// `memory://<name>` or `sanity://<project_id>/<dataset>[?token=..]`
    pub content_store_url: String,

    /// Dated API version of the content query API
    #[serde(default = "default_api_version")]
    pub content_api_version: String,

    /// Read token for the content query API. Needed for the category graph to
    /// include drafts.
    #[serde(default)]
    pub content_store_token: Option<String>,

    /// Query perspective: published, drafts or raw. The category graph is
    /// always read raw.
    #[serde(default = "default_perspective")]
    pub content_perspective: String,

    /// Query through the cached edge API
    #[serde(default)]
    pub content_use_cdn: bool,

    /// Bearer token for the admin dashboard API
    #[serde(default)]
    pub admin_api_key: Option<String>,

    /// Email provider API key
    #[serde(default)]
    pub resend_api_key: Option<String>,

    /// Sender of outgoing email
    #[serde(default = "default_mail_from")]
    pub mail_from: String,

    /// Inbox that receives pickup requests
    #[serde(default = "default_mail_to")]
    pub mail_to: String,

    /// Email provider base URL
    #[serde(default = "default_mail_api_url")]
    pub mail_api_url: String,

    /// What to do when the category graph cannot be read
    #[serde(default = "default_validation_policy")]
    pub category_validation_policy: String,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `json` for structured output, anything else for human-readable
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_perspective() -> String {
    "published".to_string()
}

fn default_mail_from() -> String {
    "admin <admin@e-waste-pickup.ca>".to_string()
}

fn default_mail_to() -> String {
    "admin@e-waste-pickup.ca".to_string()
}

fn default_mail_api_url() -> String {
    "https://api.resend.com".to_string()
}

fn default_validation_policy() -> String {
    FailurePolicy::default().to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn load() -> ServerResult<Self> {
        Self::load_from(|name| env::var(name).ok())
    }

    /// Load configuration from any variable lookup
    pub fn load_from<F>(lookup: F) -> ServerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Start with defaults
        let mut config = Self::default();

        if let Some(port) = lookup("SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            } else {
                warn!("Invalid SERVER_PORT value: {}", port);
            }
        }

        if let Some(host) = lookup("SERVER_HOST") {
            config.bind_address = host;
        }

        if let Some(url) = lookup("CONTENT_STORE_URL") {
            config.content_store_url = url;
        }

        if let Some(version) = lookup("CONTENT_API_VERSION") {
            config.content_api_version = version.trim_start_matches('v').to_string();
        }

        if let Some(token) = lookup("CONTENT_STORE_TOKEN") {
            config.content_store_token = Some(token);
        }

        if let Some(perspective) = lookup("CONTENT_PERSPECTIVE") {
            if perspective.parse::<Perspective>().is_ok() {
                config.content_perspective = perspective;
            } else {
                warn!("Invalid CONTENT_PERSPECTIVE value: {}", perspective);
            }
        }

        if let Some(use_cdn) = lookup("CONTENT_USE_CDN") {
            match parse_bool(&use_cdn) {
                Some(use_cdn) => config.content_use_cdn = use_cdn,
                None => warn!("Invalid CONTENT_USE_CDN value: {}", use_cdn),
            }
        }

        if let Some(key) = lookup("ADMIN_API_KEY") {
            config.admin_api_key = Some(key);
        }

        if let Some(key) = lookup("RESEND_API_KEY") {
            config.resend_api_key = Some(key);
        }

        if let Some(from) = lookup("MAIL_FROM") {
            config.mail_from = from;
        }

        if let Some(to) = lookup("MAIL_TO") {
            config.mail_to = to;
        }

        if let Some(url) = lookup("MAIL_API_URL") {
            config.mail_api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(policy) = lookup("CATEGORY_VALIDATION_POLICY") {
            match policy.parse::<FailurePolicy>() {
                Ok(policy) => config.category_validation_policy = policy.to_string(),
                Err(_) => warn!(
                    "Invalid CATEGORY_VALIDATION_POLICY value: {}, using {}",
                    policy, config.category_validation_policy
                ),
            }
        }

        if let Some(log_level) = lookup("LOG_LEVEL") {
            config.log_level = log_level;
        }

        if let Some(log_format) = lookup("LOG_FORMAT") {
            config.log_format = log_format;
        }

        // Validate required fields
        if config.content_store_url.is_empty() {
            return Err(ServerError::ConfigurationError(
                "Content store URL is required".to_string(),
            ));
        }

        // Add warnings for missing optional fields
        if config.admin_api_key.is_none() {
            warn!("No ADMIN_API_KEY provided - admin API will reject every request!");
        }

        if config.resend_api_key.is_none() {
            warn!("No RESEND_API_KEY provided - form submissions will fail to send!");
        }

        if config.content_store_url.starts_with("sanity://") && config.content_store_token.is_none() {
            warn!("Using the hosted content store without CONTENT_STORE_TOKEN - drafts will not be visible");
        }

        info!("Loaded server configuration");
        Ok(config)
    }

    /// Policy applied when the category graph cannot be read
    pub fn validation_policy(&self) -> ServerResult<FailurePolicy> {
        self.category_validation_policy
            .parse()
            .map_err(|e: salvage_core::CoreError| ServerError::ConfigurationError(e.to_string()))
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redacted = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("bind_address", &self.bind_address)
            .field("content_store_url", &self.content_store_url.split('?').next())
            .field("content_api_version", &self.content_api_version)
            .field("content_store_token", &redacted(&self.content_store_token))
            .field("content_perspective", &self.content_perspective)
            .field("content_use_cdn", &self.content_use_cdn)
            .field("admin_api_key", &redacted(&self.admin_api_key))
            .field("resend_api_key", &redacted(&self.resend_api_key))
            .field("mail_from", &self.mail_from)
            .field("mail_to", &self.mail_to)
            .field("mail_api_url", &self.mail_api_url)
            .field("category_validation_policy", &self.category_validation_policy)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_host(),
            content_store_url: String::new(),
            content_api_version: default_api_version(),
            content_store_token: None,
            content_perspective: default_perspective(),
            content_use_cdn: false,
            admin_api_key: None,
            resend_api_key: None,
            mail_from: default_mail_from(),
            mail_to: default_mail_to(),
            mail_api_url: default_mail_api_url(),
            category_validation_policy: default_validation_policy(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}
