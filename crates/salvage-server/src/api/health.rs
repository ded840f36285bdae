//! Health check endpoint for the Salvage Server
//!
//! This module contains the health check handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::server::SalvageServer;

/// Health check handler
///
/// Reports the server version and whether the content store answers queries.
pub async fn health_check(State(server): State<Arc<SalvageServer>>) -> impl IntoResponse {
    debug!("Health check requested");

    let content_store_status = match server.check_content_store_health().await {
        Ok(true) => "UP",
        Ok(false) => "DEGRADED",
        Err(err) => {
            warn!(?err, "Content store health check failed");
            "DOWN"
        }
    };

    let response = json!({
        "status": if content_store_status == "DOWN" { "DOWN" } else { "UP" },
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": {
            "contentStore": {
                "status": content_store_status,
                "backend": server.content_backend(),
            }
        },
    });

    let overall_status = if content_store_status == "DOWN" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (overall_status, Json(response))
}
