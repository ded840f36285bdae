//! Main Salvage Server implementation
//!
//! This module contains the SalvageServer implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info, info_span, warn, Instrument};

use salvage_content_store::ContentPorts;
use salvage_core::analytics::{
    CustomerAnalytics, DashboardSummary, JobDetail, JobListQuery, JobListView, MetalAnalytics,
};
use salvage_core::{
    normalize_blog_categories, BlogCategory, CategoryRejection, ContactForm, FormErrors,
    NewsletterForm, SubCategoryInput, SubCategoryValidator,
};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::mail::{newsletter_confirmation_email, pickup_request_email, EmailSender};

/// Result of a form submission
#[derive(Debug)]
pub enum FormSubmission {
    /// The message was handed to the provider
    Sent(String),
    /// The submission failed validation; nothing was sent
    Invalid(FormErrors),
}

/// Main server implementation
#[derive(Clone)]
pub struct SalvageServer {
    /// Configuration
    pub config: ServerConfig,

    /// Content store ports
    content: ContentPorts,

    /// Sub-category validator
    validator: SubCategoryValidator,

    /// Email sender
    mailer: Arc<dyn EmailSender>,

    /// Server address (might be different from configured if port is 0)
    address: Option<SocketAddr>,
}

/// Manual Debug implementation that doesn't try to debug the trait objects
impl std::fmt::Debug for SalvageServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalvageServer")
            .field("config", &self.config)
            .field("content", &self.content)
            .field("policy", &self.validator.policy())
            .finish()
    }
}

impl SalvageServer {
    /// Create a new SalvageServer
    pub fn new(
        config: ServerConfig,
        content: ContentPorts,
        mailer: Arc<dyn EmailSender>,
    ) -> ServerResult<Self> {
        let validator = SubCategoryValidator::new(content.graph.clone(), config.validation_policy()?);

        Ok(Self {
            config,
            content,
            validator,
            mailer,
            address: None,
        })
    }

    /// Run the server
    pub async fn run(mut self) -> ServerResult<()> {
        info!(
            backend = self.content.store.backend_name(),
            policy = %self.validator.policy(),
            "Starting Salvage Server"
        );

        // Create and bind the TCP listener
        let listener =
            TcpListener::bind((self.config.bind_address.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;

        // Store the actual bound address
        self.address = Some(addr);
        info!("Listening on {}", addr);

        let app = crate::api::build_router(Arc::new(self));

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }

    /// Get the server's bound address
    pub fn address(&self) -> SocketAddr {
        self.address
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], self.config.port)))
    }

    /// Backend name of the content store
    pub fn content_backend(&self) -> &'static str {
        self.content.store.backend_name()
    }

    /// Check content store health
    pub async fn check_content_store_health(&self) -> ServerResult<bool> {
        self.content.store.ping().await?;
        Ok(true)
    }

    /// Check an admin bearer token. Without a configured key nothing passes.
    pub fn validate_admin_token(&self, token: &str) -> bool {
        match &self.config.admin_api_key {
            Some(key) if !key.is_empty() => {
                key.len() == token.len()
                    && key
                        .bytes()
                        .zip(token.bytes())
                        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                        == 0
            }
            _ => false,
        }
    }

    /// Check a proposed sub-category list for a category
    pub async fn validate_sub_categories(&self, input: &SubCategoryInput) -> Vec<CategoryRejection> {
        self.validator.validate(input).await
    }

    /// Blog categories with post counts
    pub async fn list_categories(&self) -> ServerResult<Vec<BlogCategory>> {
        let raw = self.content.categories.list_categories().await?;
        Ok(normalize_blog_categories(raw))
    }

    /// Headline numbers for the dashboard
    pub async fn dashboard_summary(&self) -> ServerResult<DashboardSummary> {
        let rows = self.content.dashboard.job_summary().await?;
        Ok(DashboardSummary::from_rows(rows))
    }

    /// Filtered and sorted job list
    pub async fn list_jobs(&self, query: JobListQuery) -> ServerResult<JobListView> {
        let rows = self.content.dashboard.job_list().await?;
        Ok(query.apply(rows))
    }

    /// One job with references expanded
    pub async fn job_detail(&self, id: &str) -> ServerResult<JobDetail> {
        self.content
            .dashboard
            .job_detail(id)
            .await?
            .ok_or_else(|| ServerError::NotFound(format!("Job {}", id)))
    }

    /// Metal usage and value
    pub async fn metal_analytics(&self) -> ServerResult<MetalAnalytics> {
        let rows = self.content.dashboard.metal_analytics().await?;
        Ok(MetalAnalytics::from_rows(rows))
    }

    /// Customer engagement and top customers
    pub async fn customer_analytics(&self) -> ServerResult<CustomerAnalytics> {
        let rows = self.content.dashboard.customer_analytics().await?;
        Ok(CustomerAnalytics::from_rows(rows))
    }

    /// Validate a pickup request and email it to the shop
    pub async fn submit_pickup_request(&self, form: ContactForm) -> ServerResult<FormSubmission> {
        if let Err(errors) = form.validate() {
            debug!(fields = errors.field_errors.len(), "Pickup request rejected");
            return Ok(FormSubmission::Invalid(errors));
        }
        let (Some(email), Some(phone)) = (form.email.as_deref(), form.phone.as_deref()) else {
            return Err(ServerError::InternalError("validated form is missing fields".to_string()));
        };

        let message = pickup_request_email(&self.config.mail_from, &self.config.mail_to, email, phone);
        let id = self
            .mailer
            .send(&message)
            .instrument(info_span!("send_pickup_request"))
            .await?;
        Ok(FormSubmission::Sent(id))
    }

    /// Validate a newsletter sign-up and confirm it to the subscriber
    pub async fn subscribe_newsletter(&self, form: NewsletterForm) -> ServerResult<FormSubmission> {
        if let Err(errors) = form.validate() {
            return Ok(FormSubmission::Invalid(errors));
        }
        let Some(email) = form.email.as_deref() else {
            return Err(ServerError::InternalError("validated form is missing fields".to_string()));
        };

        let message = newsletter_confirmation_email(&self.config.mail_from, &self.config.mail_to, email);
        let id = self
            .mailer
            .send(&message)
            .instrument(info_span!("send_newsletter_confirmation"))
            .await?;
        Ok(FormSubmission::Sent(id))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
