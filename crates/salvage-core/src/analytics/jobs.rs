//! Job list and job detail

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

use crate::domain::documents::{Address, JobStatus};
use crate::domain::null_as_default;
use crate::CoreError;

/// Customer summary attached to a job
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobCustomer {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Company
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Phone
    #[serde(default)]
    pub phone: Option<String>,
    /// Address, detail view only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Notes, detail view only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// One row of the job list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListRow {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Title
    #[serde(default)]
    pub name: Option<String>,
    /// Human-facing job id
    #[serde(default)]
    pub job_id: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Status wire value
    #[serde(default)]
    pub status: Option<String>,
    /// Weight
    #[serde(default)]
    pub total_weight: Option<f64>,
    /// Amount paid
    #[serde(default)]
    pub total_purchase_price: Option<f64>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_created: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_completed: Option<String>,
    /// Customers
    #[serde(default, deserialize_with = "null_as_default")]
    pub customers: Vec<Option<JobCustomer>>,
    /// Number of metal entries
    #[serde(default, deserialize_with = "null_as_default")]
    pub metal_count: u64,
    /// Number of processes
    #[serde(default, deserialize_with = "null_as_default")]
    pub process_count: u64,
    /// Number of images
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_count: u64,
}

/// Metal expanded in a job detail
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetailMetal {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Type
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Price per pound
    #[serde(default)]
    pub current_price_per_pound: Option<f64>,
    /// Unit
    #[serde(default)]
    pub unit: Option<String>,
}

/// Metal entry of a job detail
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetailEntry {
    /// Array item key
    #[serde(rename = "_key", default)]
    pub key: Option<String>,
    /// Weight
    #[serde(default)]
    pub weight: Option<f64>,
    /// Amount paid
    #[serde(default)]
    pub purchase_price: Option<f64>,
    /// Notes
    #[serde(default)]
    pub notes: Option<String>,
    /// Dereferenced metal
    #[serde(default)]
    pub metal: Option<JobDetailMetal>,
}

/// Process linked from a job
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobProcessLink {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
}

/// Blog post linked from a job
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobBlogLink {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Title
    #[serde(default)]
    pub title: Option<String>,
    /// Slug string
    #[serde(default)]
    pub slug: Option<String>,
}

/// A job with its references expanded
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Title
    #[serde(default)]
    pub name: Option<String>,
    /// Human-facing job id
    #[serde(default)]
    pub job_id: Option<String>,
    /// Description
    #[serde(default)]
    pub description: Option<String>,
    /// Status wire value
    #[serde(default)]
    pub status: Option<String>,
    /// Weight
    #[serde(default)]
    pub total_weight: Option<f64>,
    /// Amount paid
    #[serde(default)]
    pub total_purchase_price: Option<f64>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_created: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_completed: Option<String>,
    /// Customers
    #[serde(default, deserialize_with = "null_as_default")]
    pub customers: Vec<Option<JobCustomer>>,
    /// Metal entries
    #[serde(default, deserialize_with = "null_as_default")]
    pub metals: Vec<JobDetailEntry>,
    /// Processes
    #[serde(default, deserialize_with = "null_as_default")]
    pub processes: Vec<Option<JobProcessLink>>,
    /// Related blog posts
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_blog_posts: Vec<Option<JobBlogLink>>,
}

/// Column the job list is sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobSortField {
    /// Title
    Name,
    /// Status
    Status,
    /// Weight
    TotalWeight,
    /// Amount paid
    TotalPurchasePrice,
    /// Creation date
    #[default]
    DateCreated,
}

impl FromStr for JobSortField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(JobSortField::Name),
            "status" => Ok(JobSortField::Status),
            "totalWeight" => Ok(JobSortField::TotalWeight),
            "totalPurchasePrice" => Ok(JobSortField::TotalPurchasePrice),
            "dateCreated" => Ok(JobSortField::DateCreated),
            other => Err(CoreError::ValidationError(format!("Unknown sort field: {}", other))),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    Asc,
    /// Largest first
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(CoreError::ValidationError(format!("Unknown sort direction: {}", other))),
        }
    }
}

/// Status filter of the job list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Every job
    #[default]
    All,
    /// Jobs with one status
    Only(JobStatus),
}

impl StatusFilter {
    fn matches(&self, row: &JobListRow) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => row.status.as_deref() == Some(status.as_str()),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

/// Filter and sort settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobListQuery {
    /// Status filter
    pub status: StatusFilter,
    /// Sort column
    pub sort: JobSortField,
    /// Sort direction
    pub direction: SortDirection,
}

/// Filtered and sorted job list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListView {
    /// Jobs shown
    pub jobs: Vec<JobListRow>,
    /// Number of jobs shown
    pub showing: usize,
    /// Number of jobs before filtering
    pub total: usize,
}

impl JobListView {
    /// `Showing N of M jobs`
    pub fn caption(&self) -> String {
        format!("Showing {} of {} jobs", self.showing, self.total)
    }
}

enum SortKey<'a> {
    Text(&'a str),
    Number(f64),
}

fn sort_key(row: &JobListRow, field: JobSortField) -> Option<SortKey<'_>> {
    match field {
        JobSortField::Name => row.name.as_deref().map(SortKey::Text),
        JobSortField::Status => row.status.as_deref().map(SortKey::Text),
        JobSortField::DateCreated => row.date_created.as_deref().map(SortKey::Text),
        JobSortField::TotalWeight => row.total_weight.map(SortKey::Number),
        JobSortField::TotalPurchasePrice => row.total_purchase_price.map(SortKey::Number),
    }
}

fn compare(a: &JobListRow, b: &JobListRow, query: &JobListQuery) -> Ordering {
    let ordering = match (sort_key(a, query.sort), sort_key(b, query.sort)) {
        (Some(SortKey::Text(a)), Some(SortKey::Text(b))) => a.cmp(b),
        (Some(SortKey::Number(a)), Some(SortKey::Number(b))) => a.total_cmp(&b),
        // rows missing the sort value go last in either direction
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        _ => Ordering::Equal,
    };

    match query.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

impl JobListQuery {
    /// Filter and sort the rows
    pub fn apply(&self, rows: Vec<JobListRow>) -> JobListView {
        let total = rows.len();
        let mut jobs: Vec<JobListRow> = rows.into_iter().filter(|r| self.status.matches(r)).collect();
        jobs.sort_by(|a, b| compare(a, b, self));

        JobListView {
            showing: jobs.len(),
            total,
            jobs,
        }
    }
}
