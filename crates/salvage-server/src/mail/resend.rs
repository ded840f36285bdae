//! Email provider HTTP client
//!
//! Sends through the provider's `POST /emails` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{EmailSender, OutgoingEmail};
use crate::error::{ServerError, ServerResult};

#[derive(Deserialize)]
struct SendResponse {
    id: String,
}

/// Email provider client
#[derive(Clone)]
pub struct ResendMailer {
    /// API key
    api_key: String,

    /// Base URL for the provider API
    api_base_url: String,

    /// HTTP client
    client: Client,
}

impl std::fmt::Debug for ResendMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendMailer")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl ResendMailer {
    /// Create a new client
    pub fn new(api_key: impl Into<String>, api_base_url: impl Into<String>) -> ServerResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ServerError::ConfigurationError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: api_key.into(),
            api_base_url: api_base_url.into(),
            client,
        })
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.api_base_url)
    }
}

#[async_trait]
impl EmailSender for ResendMailer {
    async fn send(&self, email: &OutgoingEmail) -> ServerResult<String> {
        debug!(subject = %email.subject, recipients = email.to.len(), "Sending email");

        let response = self
            .client
            .post(self.emails_url())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(email)
            .send()
            .await
            .map_err(|e| ServerError::EmailDeliveryError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response.text().await.unwrap_or_default();
            error!("Email provider rejected message: {}", error_body);
            return Err(ServerError::EmailDeliveryError(format!(
                "Failed to send email: Status {}, Error: {}",
                status, error_body
            )));
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| ServerError::EmailDeliveryError(e.to_string()))?;

        info!(id = %sent.id, "Email sent");
        Ok(sent.id)
    }
}
