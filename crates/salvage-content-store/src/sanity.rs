//! Hosted content platform query client
//!
//! Runs GROQ queries against the platform's HTTP query endpoint:
//! `GET {base}/v{apiVersion}/data/query/{dataset}?query=..&$param=..`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, warn};

use salvage_core::analytics::{
    CustomerAnalyticsRows, JobDetail, JobListRow, JobSummaryRows, MetalAnalyticsRows,
};
use salvage_core::{
    CategoryGraphSource, CategoryListing, CategoryNode, CategoryQueries, CoreError,
    DashboardQueries,
};

use crate::queries;
use crate::{ContentStore, ContentStoreError, ContentStoreResult};

/// Default API version pinned for queries
pub const DEFAULT_API_VERSION: &str = "2023-10-01";

/// Which documents a query sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Perspective {
    /// Published documents only
    #[default]
    Published,
    /// Drafts overlaid on published documents
    Drafts,
    /// Drafts and published documents side by side
    Raw,
}

impl Perspective {
    /// Query parameter value
    pub fn as_str(&self) -> &'static str {
        match self {
            Perspective::Published => "published",
            Perspective::Drafts => "drafts",
            Perspective::Raw => "raw",
        }
    }
}

impl FromStr for Perspective {
    type Err = ContentStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "published" => Ok(Perspective::Published),
            "drafts" | "previewDrafts" => Ok(Perspective::Drafts),
            "raw" => Ok(Perspective::Raw),
            other => Err(ContentStoreError::ConfigurationError(format!(
                "Unknown perspective: {}",
                other
            ))),
        }
    }
}

/// Connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct SanityConfig {
    /// Project id
    pub project_id: String,
    /// Dataset name
    pub dataset: String,
    /// Dated API version, without the leading `v`
    pub api_version: String,
    /// Read token for private datasets or drafts
    pub token: Option<String>,
    /// Query perspective
    pub perspective: Perspective,
    /// Use the cached edge API
    pub use_cdn: bool,
}

impl SanityConfig {
    /// Settings for a public dataset
    pub fn new(project_id: impl Into<String>, dataset: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset: dataset.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
            perspective: Perspective::default(),
            use_cdn: false,
        }
    }
}

impl fmt::Debug for SanityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SanityConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("perspective", &self.perspective)
            .field("use_cdn", &self.use_cdn)
            .finish()
    }
}

#[derive(Deserialize)]
struct QueryEnvelope<T> {
    result: Option<T>,
}

/// Query client for the hosted content platform
#[derive(Debug, Clone)]
pub struct SanityContentStore {
    config: SanityConfig,

    /// Base URL, without the version segment
    api_base_url: String,

    /// HTTP client
    client: Client,
}

impl SanityContentStore {
    /// Create a new client
    pub fn new(config: SanityConfig) -> ContentStoreResult<Self> {
        if config.project_id.is_empty() || config.dataset.is_empty() {
            return Err(ContentStoreError::ConfigurationError(
                "project id and dataset are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ContentStoreError::BackendError(e.into()))?;

        let host = if config.use_cdn { "apicdn.sanity.io" } else { "api.sanity.io" };
        let api_base_url = format!("https://{}.{}", config.project_id, host);

        Ok(Self {
            config,
            api_base_url,
            client,
        })
    }

    /// Point the client at another base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api_base_url = base_url.into();
        self
    }

    /// Connection settings
    pub fn config(&self) -> &SanityConfig {
        &self.config
    }

    fn query_endpoint(&self) -> String {
        format!(
            "{}/v{}/data/query/{}",
            self.api_base_url, self.config.api_version, self.config.dataset
        )
    }

    /// Run a query and decode the `result` field. `null` results come back as `None`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, serde_json::Value)],
    ) -> ContentStoreResult<Option<T>> {
        self.fetch_with_perspective(query, params, self.config.perspective)
            .await
    }

    /// Run a query with an explicit perspective instead of the configured one
    pub async fn fetch_with_perspective<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, serde_json::Value)],
        perspective: Perspective,
    ) -> ContentStoreResult<Option<T>> {
        let mut pairs: Vec<(String, String)> = vec![
            ("query".to_string(), query.to_string()),
            ("perspective".to_string(), perspective.as_str().to_string()),
        ];
        for (name, value) in params {
            // parameters are passed JSON-encoded
            pairs.push((format!("${}", name), serde_json::to_string(value)?));
        }

        let mut request = self.client.get(self.query_endpoint()).query(&pairs);
        if let Some(token) = &self.config.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        debug!(
            dataset = %self.config.dataset,
            perspective = perspective.as_str(),
            "Running content query"
        );
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ContentStoreError::Timeout(e.to_string())
            } else {
                ContentStoreError::BackendError(e.into())
            }
        })?;

        match response.status() {
            status if status.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| ContentStoreError::BackendError(e.into()))?;
                let envelope: QueryEnvelope<T> = serde_json::from_slice(&body)?;
                Ok(envelope.result)
            }
            StatusCode::NOT_FOUND => Err(ContentStoreError::NotFound(format!(
                "dataset {}",
                self.config.dataset
            ))),
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("Content query failed: {}", error_text);
                Err(ContentStoreError::BackendError(anyhow::anyhow!(
                    "Content query failed: Status {}, Error: {}",
                    status,
                    error_text
                )))
            }
        }
    }

    async fn fetch_or_default<T: DeserializeOwned + Default>(
        &self,
        query: &str,
    ) -> ContentStoreResult<T> {
        Ok(self.fetch(query, &[]).await?.unwrap_or_default())
    }
}

/// The graph is always read raw so unsaved drafts take part in cycle checks.
/// Draft documents are only returned to requests carrying a read token.
#[async_trait]
impl CategoryGraphSource for SanityContentStore {
    async fn fetch_category_graph(&self) -> Result<Vec<CategoryNode>, CoreError> {
        if self.config.token.is_none() {
            warn!("No read token configured, category graph will not include drafts");
        }
        let nodes = self
            .fetch_with_perspective(queries::CATEGORY_GRAPH_QUERY, &[], Perspective::Raw)
            .await?;
        Ok(nodes.unwrap_or_default())
    }
}

#[async_trait]
impl CategoryQueries for SanityContentStore {
    async fn list_categories(&self) -> Result<Vec<Option<CategoryListing>>, CoreError> {
        Ok(self.fetch_or_default(queries::CATEGORIES_QUERY).await?)
    }
}

#[async_trait]
impl DashboardQueries for SanityContentStore {
    async fn job_summary(&self) -> Result<JobSummaryRows, CoreError> {
        Ok(self.fetch_or_default(queries::JOBS_DASHBOARD_SUMMARY_QUERY).await?)
    }

    async fn job_list(&self) -> Result<Vec<JobListRow>, CoreError> {
        Ok(self.fetch_or_default(queries::JOBS_LIST_QUERY).await?)
    }

    async fn job_detail(&self, id: &str) -> Result<Option<JobDetail>, CoreError> {
        let params = [("jobId", serde_json::Value::String(id.to_string()))];
        Ok(self.fetch(queries::JOB_DETAIL_QUERY, &params).await?)
    }

    async fn metal_analytics(&self) -> Result<MetalAnalyticsRows, CoreError> {
        Ok(self.fetch_or_default(queries::METAL_ANALYTICS_QUERY).await?)
    }

    async fn customer_analytics(&self) -> Result<CustomerAnalyticsRows, CoreError> {
        Ok(self.fetch_or_default(queries::CUSTOMER_ANALYTICS_QUERY).await?)
    }
}

#[async_trait]
impl ContentStore for SanityContentStore {
    async fn ping(&self) -> ContentStoreResult<()> {
        self.fetch::<serde_json::Value>(queries::PING_QUERY, &[]).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sanity"
    }
}
