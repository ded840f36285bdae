//! Read-only ports onto the content store
//!
//! The hosted content platform is an external collaborator. These traits are
//! the only way the domain reads from it; `salvage-content-store` provides the
//! HTTP and in-memory implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::category::CategoryListing;
use super::null_as_default;
use crate::analytics::{
    CustomerAnalyticsRows, JobDetail, JobListRow, JobSummaryRows, MetalAnalyticsRows,
};
use crate::CoreError;

/// One category as seen by the sub-category validator: its raw id and the raw
/// ids its sub-category references point at.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    /// Raw document id, possibly draft-prefixed
    #[serde(rename = "_id")]
    pub id: String,
    /// `subCategories[]._ref`; entries are `null` for references without a target
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_categories: Vec<Option<String>>,
}

impl CategoryNode {
    /// Build a node
    pub fn new<I, S>(id: impl Into<String>, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            sub_categories: children.into_iter().map(|c| Some(c.into())).collect(),
        }
    }
}

/// Source of the category graph snapshot
#[async_trait]
pub trait CategoryGraphSource: Send + Sync {
    /// Fetch every category's id and sub-category reference ids
    async fn fetch_category_graph(&self) -> Result<Vec<CategoryNode>, CoreError>;
}

/// Queries backing the public blog taxonomy
#[async_trait]
pub trait CategoryQueries: Send + Sync {
    /// List categories with their post counts
    async fn list_categories(&self) -> Result<Vec<Option<CategoryListing>>, CoreError>;
}

/// Queries backing the admin dashboard
#[async_trait]
pub trait DashboardQueries: Send + Sync {
    /// Job counts, totals and the most recent jobs
    async fn job_summary(&self) -> Result<JobSummaryRows, CoreError>;

    /// Every job, newest first
    async fn job_list(&self) -> Result<Vec<JobListRow>, CoreError>;

    /// A single job with its references expanded
    async fn job_detail(&self, id: &str) -> Result<Option<JobDetail>, CoreError>;

    /// Metal catalogue and usage across jobs
    async fn metal_analytics(&self) -> Result<MetalAnalyticsRows, CoreError>;

    /// Customer counts and the top customers by job count
    async fn customer_analytics(&self) -> Result<CustomerAnalyticsRows, CoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_category_node_wire_shape() {
        let nodes: Vec<CategoryNode> = serde_json::from_value(json!([
            {"_id": "drafts.a", "subCategories": ["b", null]},
            {"_id": "b", "subCategories": null},
            {"_id": "c"}
        ]))
        .unwrap();

        assert_eq!(nodes[0].sub_categories, vec![Some("b".to_string()), None]);
        assert!(nodes[1].sub_categories.is_empty());
        assert!(nodes[2].sub_categories.is_empty());
        assert_eq!(CategoryNode::new("x", ["y"]).sub_categories, vec![Some("y".to_string())]);
    }
}
