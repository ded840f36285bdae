//! Job summary cards

use serde::{Deserialize, Serialize};

use super::{average, percentage};
use crate::domain::null_as_default;

/// Weight and price of one job, as returned for the totals
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTotals {
    /// Weight in pounds
    #[serde(default)]
    pub total_weight: Option<f64>,
    /// Amount paid
    #[serde(default)]
    pub total_purchase_price: Option<f64>,
}

/// A recently created job
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentJob {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Title
    #[serde(default)]
    pub name: Option<String>,
    /// Human-facing job id
    #[serde(default)]
    pub job_id: Option<String>,
    /// Status
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
    /// Number of customers on the job
    #[serde(default, deserialize_with = "null_as_default")]
    pub customer_count: u64,
}

/// Result of the dashboard summary query
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSummaryRows {
    /// All jobs
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_jobs: u64,
    /// Completed jobs
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed_jobs: u64,
    /// In-progress jobs
    #[serde(default, deserialize_with = "null_as_default")]
    pub in_progress_jobs: u64,
    /// Cancelled jobs
    #[serde(default, deserialize_with = "null_as_default")]
    pub cancelled_jobs: u64,
    /// Totals of every job
    #[serde(default, deserialize_with = "null_as_default")]
    pub all_jobs: Vec<JobTotals>,
    /// Up to five most recent jobs
    #[serde(default, deserialize_with = "null_as_default")]
    pub recent_jobs: Vec<RecentJob>,
}

/// Direction of the completion-rate indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    /// Above 80%
    Positive,
    /// Above 60%
    Neutral,
    /// 60% or below
    Negative,
}

impl Trend {
    /// Classify a completion rate in percent
    pub fn from_completion_rate(rate: f64) -> Self {
        if rate > 80.0 {
            Trend::Positive
        } else if rate > 60.0 {
            Trend::Neutral
        } else {
            Trend::Negative
        }
    }
}

/// Summary cards shown at the top of the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// All jobs
    pub total_jobs: u64,
    /// Completed jobs
    pub completed_jobs: u64,
    /// In-progress jobs
    pub in_progress_jobs: u64,
    /// Cancelled jobs
    pub cancelled_jobs: u64,
    /// Pounds processed
    pub total_weight: f64,
    /// Amount paid across all jobs
    pub total_revenue: f64,
    /// Revenue per job
    pub average_job_value: f64,
    /// Completed over total, in percent
    pub completion_rate: f64,
    /// Completion indicator
    pub completion_trend: Trend,
    /// Most recent jobs
    pub recent_jobs: Vec<RecentJob>,
}

impl DashboardSummary {
    /// Compute the cards from the query result
    pub fn from_rows(rows: JobSummaryRows) -> Self {
        let total_weight: f64 = rows.all_jobs.iter().filter_map(|j| j.total_weight).sum();
        let total_revenue: f64 = rows
            .all_jobs
            .iter()
            .filter_map(|j| j.total_purchase_price)
            .sum();
        let completion_rate = percentage(rows.completed_jobs as f64, rows.total_jobs as f64);

        Self {
            total_jobs: rows.total_jobs,
            completed_jobs: rows.completed_jobs,
            in_progress_jobs: rows.in_progress_jobs,
            cancelled_jobs: rows.cancelled_jobs,
            total_weight,
            total_revenue,
            average_job_value: average(total_revenue, rows.all_jobs.len()),
            completion_rate,
            completion_trend: Trend::from_completion_rate(completion_rate),
            recent_jobs: rows.recent_jobs,
        }
    }
}
