//! Document identifiers and references
//!
//! The content platform keeps unpublished edits under a `drafts.` prefixed id.
//! A draft and its published document are the same logical entity, so every
//! comparison in this crate goes through [`DocumentId::normalize`].

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Prefix the content platform puts in front of draft document ids
pub const DRAFTS_PREFIX: &str = "drafts.";

/// A normalized document identifier (never carries the draft prefix, never empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Strip a leading draft prefix. Returns `None` when nothing is left.
    pub fn normalize(raw: &str) -> Option<Self> {
        let id = raw.strip_prefix(DRAFTS_PREFIX).unwrap_or(raw);
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_string()))
        }
    }

    /// Whether a raw id points at a draft
    pub fn is_draft(raw: &str) -> bool {
        raw.starts_with(DRAFTS_PREFIX)
    }

    /// Id of the draft twin of this document
    pub fn draft_id(&self) -> String {
        format!("{}{}", DRAFTS_PREFIX, self.0)
    }

    /// Get the string representation of the id
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to owned String
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference value as stored in a document array or field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reference {
    /// Raw id of the referenced document, possibly draft-prefixed
    #[serde(rename = "_ref", default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,

    /// Always `reference` when written by the authoring studio
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Array item key
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Weak references do not block deletion of the target
    #[serde(rename = "_weak", default, skip_serializing_if = "Option::is_none")]
    pub weak: Option<bool>,
}

impl Reference {
    /// Build a strong reference to a document id
    pub fn to(id: impl Into<String>) -> Self {
        Self {
            target_id: Some(id.into()),
            kind: Some("reference".to_string()),
            key: None,
            weak: None,
        }
    }

    /// Set the array item key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Normalized id of the referenced document, if any
    pub fn target(&self) -> Option<DocumentId> {
        self.target_id.as_deref().and_then(DocumentId::normalize)
    }
}
