//! API module for the Salvage Server
//!
//! This module contains the API routes and handlers for the Salvage Server.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::{self as axum_middleware, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

pub mod categories;
pub mod dashboard;
pub mod errors;
pub mod forms;
pub mod health;

use crate::server::SalvageServer;
use errors::ApiError;

/// Build the router for API endpoints
pub fn build_router(server: Arc<SalvageServer>) -> Router {
    // Dashboard, bearer token required
    let admin = Router::new()
        .route("/dashboard/summary", get(dashboard::summary_handler))
        .route("/dashboard/jobs", get(dashboard::list_jobs_handler))
        .route("/dashboard/jobs/:id", get(dashboard::job_detail_handler))
        .route("/dashboard/metals", get(dashboard::metals_handler))
        .route("/dashboard/customers", get(dashboard::customers_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            server.clone(),
            auth_middleware,
        ));

    Router::new()
        // Category authoring
        .route("/api/v1/categories", get(categories::list_categories_handler))
        .route(
            "/api/v1/categories/validate",
            post(categories::validate_sub_categories_handler),
        )
        // Public forms
        .route("/api/send", post(forms::pickup_request_handler))
        .route("/api/v1/newsletter", post(forms::newsletter_handler))
        .nest("/api/v1/admin", admin)
        // Health check
        .route("/health", get(health::health_check))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        // Shared state
        .with_state(server)
}

/// Authentication middleware for the admin routes
async fn auth_middleware(
    headers: HeaderMap,
    State(server): State<Arc<SalvageServer>>,
    request: Request,
    next: Next,
) -> Response {
    let token = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    if let Some(token) = token {
        if server.validate_admin_token(token) {
            return next.run(request).await;
        }
    }

    warn!(path = %request.uri().path(), "Rejected admin request");
    ApiError::Unauthorized("Invalid or missing authentication token".to_string()).into_response()
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound("No such route".to_string())
}
