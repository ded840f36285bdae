//! Category authoring API
//!
//! Validation the authoring studio calls before saving a category's
//! sub-categories, and the public category listing.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use salvage_core::{BlogCategory, Reference, SubCategoryInput};

use crate::api::errors::api_error_response;
use crate::server::SalvageServer;

/// Request to validate a sub-category list
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateSubCategoriesRequest {
    /// Id of the category being edited, possibly draft-prefixed
    #[serde(default)]
    pub document_id: Option<String>,
    /// Proposed sub-category references
    #[serde(default)]
    pub sub_categories: Option<Vec<Reference>>,
}

/// Validation verdict
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateSubCategoriesResponse {
    /// Whether the edit may be saved
    pub valid: bool,
    /// Messages for the author
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

/// Response for listing categories
#[derive(Debug, Serialize, Deserialize)]
pub struct ListCategoriesResponse {
    /// Categories with post counts
    pub categories: Vec<BlogCategory>,
}

/// Handler for validating a category's sub-categories
pub async fn validate_sub_categories_handler(
    State(server): State<Arc<SalvageServer>>,
    Json(request): Json<ValidateSubCategoriesRequest>,
) -> impl IntoResponse {
    let input = SubCategoryInput::new(
        request.document_id.as_deref(),
        request.sub_categories.as_deref(),
    );

    let rejections = server.validate_sub_categories(&input).await;
    if !rejections.is_empty() {
        info!(
            document_id = ?request.document_id,
            rejections = rejections.len(),
            "Sub-categories rejected"
        );
    }

    Json(ValidateSubCategoriesResponse {
        valid: rejections.is_empty(),
        errors: rejections.iter().map(|r| r.message().to_string()).collect(),
    })
}

/// Handler for the blog category listing
pub async fn list_categories_handler(State(server): State<Arc<SalvageServer>>) -> impl IntoResponse {
    match server.list_categories().await {
        Ok(categories) => (StatusCode::OK, Json(ListCategoriesResponse { categories })).into_response(),
        Err(err) => {
            error!(?err, "Failed to list categories");
            api_error_response(&err)
        }
    }
}
