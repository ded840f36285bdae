//! Blog categories
//!
//! Categories organise blog posts into top-level categories and sub-categories.
//! The sub-category references form the graph checked by
//! [`crate::validation::SubCategoryValidator`].

use serde::{Deserialize, Serialize};

use super::documents::{require_text, FieldError};
use super::identifiers::{DocumentId, Reference};
use super::null_as_default;

/// Longest slug the authoring studio generates
pub const MAX_SLUG_LENGTH: usize = 200;

/// Slug field as stored by the content platform
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slug {
    /// Always `slug` when written by the studio
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// The URL-friendly value
    #[serde(default)]
    pub current: Option<String>,
}

impl Slug {
    /// Build a slug value
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            kind: Some("slug".to_string()),
            current: Some(current.into()),
        }
    }

    /// Current value, if set and not blank
    pub fn value(&self) -> Option<&str> {
        self.current.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// A category document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Raw document id (may be a draft id)
    #[serde(rename = "_id")]
    pub id: String,
    /// Label shown to readers
    #[serde(default)]
    pub name: Option<String>,
    /// URL-friendly version of the name
    #[serde(default)]
    pub slug: Option<Slug>,
    /// Optional description used on listing pages
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered sub-category references
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_categories: Vec<Reference>,
}

impl Category {
    /// Create a category with a slug derived from its name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            slug: Some(Slug::new(slugify(&name))),
            name: Some(name),
            description: None,
            sub_categories: Vec::new(),
        }
    }

    /// Add a sub-category reference
    pub fn with_sub_category(mut self, id: impl Into<String>) -> Self {
        self.sub_categories.push(Reference::to(id));
        self
    }

    /// Normalized id of this category
    pub fn document_id(&self) -> Option<DocumentId> {
        DocumentId::normalize(&self.id)
    }

    /// Field rules that do not need the content store
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "name", self.name.as_deref(), "A category name is required");
        if self.slug.as_ref().and_then(Slug::value).is_none() {
            errors.push(FieldError::new("slug", "A category slug is required"));
        }
        errors
    }

    /// Title and subtitle shown in studio lists
    pub fn preview(&self) -> CategoryPreview {
        let title = self
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled category".to_string());

        let label = match self.sub_categories.len() {
            0 => "No sub-categories".to_string(),
            n => format!("{} sub-categories", n),
        };
        let slug = self
            .slug
            .as_ref()
            .and_then(Slug::value)
            .unwrap_or("No slug");

        CategoryPreview {
            title,
            subtitle: format!("{} • {}", label, slug),
        }
    }
}

/// Studio list preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryPreview {
    /// Main line
    pub title: String,
    /// Secondary line
    pub subtitle: String,
}

/// Turn a display name into a URL-friendly slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    if slug.chars().count() > MAX_SLUG_LENGTH {
        slug = slug.chars().take(MAX_SLUG_LENGTH).collect();
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    slug
}

/// One row of the category listing query
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Slug as stored
    #[serde(default)]
    pub slug: Option<SlugValue>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Number of blog posts referencing the category
    #[serde(default, deserialize_with = "null_as_default")]
    pub post_count: u64,
    /// Nested categories, when the query expands them
    #[serde(default, deserialize_with = "null_as_default")]
    pub sub_categories: Vec<Option<CategoryListing>>,
}

/// A slug coming back from a query: either projected to a string or left as an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlugValue {
    /// `"slug": slug.current`
    Plain(String),
    /// `slug` projected as stored
    Object(Slug),
}

impl SlugValue {
    /// The slug string, if any
    pub fn current(&self) -> Option<&str> {
        match self {
            SlugValue::Plain(s) => Some(s.as_str()),
            SlugValue::Object(slug) => slug.current.as_deref(),
        }
    }
}

/// Category as rendered on the public blog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogCategory {
    /// Document id, empty when the query did not return one
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Slug string, empty when missing
    pub slug: String,
    /// Description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Number of posts in the category
    pub post_count: u64,
    /// Nested categories
    pub sub_categories: Vec<BlogCategory>,
}

/// Drop unnamed or missing categories and flatten slug shapes, recursively.
pub fn normalize_blog_categories(raw: Vec<Option<CategoryListing>>) -> Vec<BlogCategory> {
    raw.into_iter()
        .flatten()
        .filter(|c| c.name.as_deref().is_some_and(|n| !n.is_empty()))
        .map(normalize_category)
        .collect()
}

fn normalize_category(category: CategoryListing) -> BlogCategory {
    BlogCategory {
        id: category.id,
        name: category.name.unwrap_or_default(),
        slug: category
            .slug
            .as_ref()
            .and_then(SlugValue::current)
            .unwrap_or_default()
            .to_string(),
        description: category.description,
        post_count: category.post_count,
        sub_categories: normalize_blog_categories(category.sub_categories),
    }
}
