//!
//! Salvage Core - domain layer for the Salvage back-office
//!
//! This crate defines the content documents of the recycling business, the
//! sub-category graph validator, the dashboard analytics and the public form
//! schemas. Everything that talks to the hosted content store goes through the
//! ports in [`domain::repository`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Domain layer - documents, identifiers and ports
pub mod domain;

/// Field validation rules that need the content store
pub mod validation;

/// Dashboard aggregation over query results
pub mod analytics;

/// Public form schemas
pub mod forms;

/// Error types
pub mod error;

// Re-export key types
pub use error::{CoreError, CoreResult};

pub use domain::identifiers::{DocumentId, Reference, DRAFTS_PREFIX};
pub use domain::category::{normalize_blog_categories, slugify, BlogCategory, Category, CategoryListing};
pub use domain::documents::{FieldError, Job, JobStatus};
pub use domain::repository::{CategoryGraphSource, CategoryNode, CategoryQueries, DashboardQueries};

pub use validation::{
    CategoryGraph, CategoryRejection, FailurePolicy, SubCategoryInput, SubCategoryValidator,
    ValidationOutcome,
};

pub use forms::{ContactForm, FormErrors, NewsletterForm};
