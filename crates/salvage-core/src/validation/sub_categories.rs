use std::sync::Arc;
use tracing::{debug, info_span, Instrument};

use super::{CategoryGraph, CategoryRejection, FailurePolicy, InfraError, SubCategoryInput, ValidationOutcome};
use crate::domain::repository::CategoryGraphSource;

/// Check proposed sub-categories against a fresh snapshot of the category graph.
///
/// Empty proposals and unknown document ids pass without touching the source.
/// A self-reference is reported before any fetch. Otherwise the graph is
/// walked from each candidate and the first one that reaches the category
/// rejects the whole proposal.
pub async fn check_sub_categories(
    source: &dyn CategoryGraphSource,
    input: &SubCategoryInput,
) -> Result<ValidationOutcome, InfraError> {
    if input.proposed.is_empty() {
        return Ok(ValidationOutcome::Valid);
    }
    let Some(document_id) = &input.document_id else {
        return Ok(ValidationOutcome::Valid);
    };

    if input.proposed.contains(document_id) {
        return Ok(ValidationOutcome::Rejected(CategoryRejection::SelfReference));
    }

    let graph = CategoryGraph::from_nodes(source.fetch_category_graph().await?);
    debug!(%document_id, categories = graph.len(), "Loaded category graph");

    for candidate in &input.proposed {
        if graph.reaches(candidate, document_id) {
            debug!(%document_id, %candidate, "Sub-category would create a cycle");
            return Ok(ValidationOutcome::Rejected(CategoryRejection::CircularReference));
        }
    }

    Ok(ValidationOutcome::Valid)
}

/// Runs every sub-category rule and applies the failure policy
#[derive(Clone)]
pub struct SubCategoryValidator {
    source: Arc<dyn CategoryGraphSource>,
    policy: FailurePolicy,
}

impl SubCategoryValidator {
    /// Create a validator over a graph source
    pub fn new(source: Arc<dyn CategoryGraphSource>, policy: FailurePolicy) -> Self {
        Self { source, policy }
    }

    /// Configured failure policy
    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// All rejections for a proposal. Empty means valid.
    ///
    /// Uniqueness is reported independently of the graph check.
    pub async fn validate(&self, input: &SubCategoryInput) -> Vec<CategoryRejection> {
        let span = info_span!(
            "validate_sub_categories",
            document_id = input.document_id.as_ref().map(|id| id.as_str()).unwrap_or(""),
            proposed = input.proposed.len(),
        );

        async {
            let mut rejections = Vec::new();
            if input.has_duplicates() {
                rejections.push(CategoryRejection::DuplicateReference);
            }

            let result = check_sub_categories(self.source.as_ref(), input).await;
            if let ValidationOutcome::Rejected(rejection) = self.policy.resolve(result) {
                rejections.push(rejection);
            }
            rejections
        }
        .instrument(span)
        .await
    }
}
