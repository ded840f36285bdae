//! Public form API
//!
//! Both forms answer 400 with `{ fieldErrors }` when a field fails, or
//! `{ data: { id } }` once the email is handed to the provider.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use salvage_core::{ContactForm, NewsletterForm};

use crate::api::errors::api_error_response;
use crate::error::ServerResult;
use crate::server::{FormSubmission, SalvageServer};

fn submission_response(result: ServerResult<FormSubmission>) -> axum::response::Response {
    match result {
        Ok(FormSubmission::Sent(id)) => {
            (StatusCode::OK, Json(json!({ "data": { "id": id } }))).into_response()
        }
        Ok(FormSubmission::Invalid(errors)) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
        Err(err) => {
            error!(?err, "Failed to send form email");
            api_error_response(&err)
        }
    }
}

/// Handler for the pickup request form
pub async fn pickup_request_handler(
    State(server): State<Arc<SalvageServer>>,
    Json(form): Json<ContactForm>,
) -> impl IntoResponse {
    submission_response(server.submit_pickup_request(form).await)
}

/// Handler for the newsletter sign-up form
pub async fn newsletter_handler(
    State(server): State<Arc<SalvageServer>>,
    Json(form): Json<NewsletterForm>,
) -> impl IntoResponse {
    submission_response(server.subscribe_newsletter(form).await)
}
