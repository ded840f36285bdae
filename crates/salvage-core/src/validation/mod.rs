//! Sub-category validation
//!
//! A category may not contain itself, directly or through its sub-categories.
//! The check reads a fresh snapshot of every category's stored sub-category
//! references and walks it from each proposed sub-category.

mod graph;
mod policy;
mod sub_categories;

pub use graph::CategoryGraph;
pub use policy::FailurePolicy;
pub use sub_categories::{check_sub_categories, SubCategoryValidator};

use serde::Serialize;
use std::collections::HashSet;

use crate::domain::identifiers::{DocumentId, Reference};
use crate::CoreError;

/// Infrastructure failures surfaced by the graph check
pub type InfraError = CoreError;

/// Message for a category listing itself
pub const SELF_REFERENCE_MESSAGE: &str = "A category cannot include itself as a sub-category";
/// Message for an indirect cycle
pub const CIRCULAR_REFERENCE_MESSAGE: &str = "Circular sub-category relationships are not allowed";
/// Message for a repeated reference
pub const DUPLICATE_MESSAGE: &str = "Sub-categories must be unique";
/// Message when the graph cannot be fetched and the policy is fail-closed
pub const UNAVAILABLE_MESSAGE: &str = "Sub-category validation is temporarily unavailable";

/// Validation context, parsed at the boundary
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubCategoryInput {
    /// Normalized id of the category being edited, if known
    pub document_id: Option<DocumentId>,
    /// Normalized targets of the proposed references, in order
    pub proposed: Vec<DocumentId>,
}

impl SubCategoryInput {
    /// Parse a raw document id and raw references. References without a target are ignored.
    pub fn new(raw_document_id: Option<&str>, references: Option<&[Reference]>) -> Self {
        Self {
            document_id: raw_document_id.and_then(DocumentId::normalize),
            proposed: references
                .unwrap_or_default()
                .iter()
                .filter_map(Reference::target)
                .collect(),
        }
    }

    /// Whether any target appears more than once
    pub fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::new();
        self.proposed.iter().any(|id| !seen.insert(id))
    }
}

/// Why sub-categories were refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryRejection {
    /// The category lists itself
    SelfReference,
    /// A proposed sub-category already contains the category
    CircularReference,
    /// The same sub-category is listed twice
    DuplicateReference,
    /// The graph could not be checked
    ValidationUnavailable,
}

impl CategoryRejection {
    /// Author-facing message
    pub fn message(&self) -> &'static str {
        match self {
            CategoryRejection::SelfReference => SELF_REFERENCE_MESSAGE,
            CategoryRejection::CircularReference => CIRCULAR_REFERENCE_MESSAGE,
            CategoryRejection::DuplicateReference => DUPLICATE_MESSAGE,
            CategoryRejection::ValidationUnavailable => UNAVAILABLE_MESSAGE,
        }
    }
}

impl std::fmt::Display for CategoryRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Result of the graph check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// Accept the edit
    Valid,
    /// Refuse the edit
    Rejected(CategoryRejection),
}

impl ValidationOutcome {
    /// Whether the edit is accepted
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Field-rule form: `Ok(())` or the message
    pub fn into_rule_result(self) -> Result<(), String> {
        match self {
            ValidationOutcome::Valid => Ok(()),
            ValidationOutcome::Rejected(rejection) => Err(rejection.message().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_normalizes_ids() {
        let refs = vec![
            Reference::to("drafts.b"),
            Reference::default(),
            Reference::to("c"),
        ];
        let input = SubCategoryInput::new(Some("drafts.a"), Some(&refs));

        assert_eq!(input.document_id.unwrap().as_str(), "a");
        let proposed: Vec<&str> = input.proposed.iter().map(DocumentId::as_str).collect();
        assert_eq!(proposed, vec!["b", "c"]);
    }

    #[test]
    fn test_input_without_references() {
        let input = SubCategoryInput::new(None, None);
        assert!(input.document_id.is_none());
        assert!(input.proposed.is_empty());
        assert!(!input.has_duplicates());
    }

    #[test]
    fn test_duplicates_compare_normalized() {
        let refs = vec![Reference::to("b"), Reference::to("drafts.b")];
        assert!(SubCategoryInput::new(Some("a"), Some(&refs)).has_duplicates());
    }

    #[test]
    fn test_rule_result() {
        assert_eq!(ValidationOutcome::Valid.into_rule_result(), Ok(()));
        assert_eq!(
            ValidationOutcome::Rejected(CategoryRejection::CircularReference).into_rule_result(),
            Err(CIRCULAR_REFERENCE_MESSAGE.to_string())
        );
    }
}
