//! Admin dashboard API
//!
//! Read-only analytics over jobs, metals and customers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use salvage_core::analytics::{JobListQuery, JobListView};
use salvage_core::CoreError;

use crate::api::errors::{api_error_response, ApiError};
use crate::server::SalvageServer;

/// Query parameters of the job list
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct JobListParams {
    /// `all` or a job status
    pub status: Option<String>,
    /// Sort column
    pub sort: Option<String>,
    /// `asc` or `desc`
    pub direction: Option<String>,
}

impl JobListParams {
    /// Parse into a list query; missing or empty values keep the defaults
    pub fn into_query(self) -> Result<JobListQuery, CoreError> {
        let mut query = JobListQuery::default();
        if let Some(status) = self.status.filter(|s| !s.is_empty()) {
            query.status = status.parse()?;
        }
        if let Some(sort) = self.sort.filter(|s| !s.is_empty()) {
            query.sort = sort.parse()?;
        }
        if let Some(direction) = self.direction.filter(|s| !s.is_empty()) {
            query.direction = direction.parse()?;
        }
        Ok(query)
    }
}

/// Job list with its caption
#[derive(Debug, Serialize)]
pub struct JobListResponse {
    #[serde(flatten)]
    pub view: JobListView,
    pub caption: String,
}

/// Handler for the summary cards
pub async fn summary_handler(State(server): State<Arc<SalvageServer>>) -> impl IntoResponse {
    match server.dashboard_summary().await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => {
            error!(?err, "Failed to load dashboard summary");
            api_error_response(&err)
        }
    }
}

/// Handler for the job list
pub async fn list_jobs_handler(
    State(server): State<Arc<SalvageServer>>,
    Query(params): Query<JobListParams>,
) -> impl IntoResponse {
    let query = match params.into_query() {
        Ok(query) => query,
        Err(err) => return ApiError::BadRequest(err.to_string()).into_response(),
    };

    match server.list_jobs(query).await {
        Ok(view) => {
            let caption = view.caption();
            (StatusCode::OK, Json(JobListResponse { view, caption })).into_response()
        }
        Err(err) => {
            error!(?err, "Failed to list jobs");
            api_error_response(&err)
        }
    }
}

/// Handler for one job
pub async fn job_detail_handler(
    State(server): State<Arc<SalvageServer>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    info!(%id, "Getting job");

    match server.job_detail(&id).await {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(err) => api_error_response(&err),
    }
}

/// Handler for metal analytics
pub async fn metals_handler(State(server): State<Arc<SalvageServer>>) -> impl IntoResponse {
    match server.metal_analytics().await {
        Ok(analytics) => (StatusCode::OK, Json(analytics)).into_response(),
        Err(err) => {
            error!(?err, "Failed to load metal analytics");
            api_error_response(&err)
        }
    }
}

/// Handler for customer analytics
pub async fn customers_handler(State(server): State<Arc<SalvageServer>>) -> impl IntoResponse {
    match server.customer_analytics().await {
        Ok(analytics) => (StatusCode::OK, Json(analytics)).into_response(),
        Err(err) => {
            error!(?err, "Failed to load customer analytics");
            api_error_response(&err)
        }
    }
}
