//! Dashboard analytics
//!
//! The content store filters and joins; this module does the display
//! arithmetic (sums, averages, percentages, maxima) over the returned rows.
//! Missing numbers count as zero and empty inputs never divide by zero.

pub mod customers;
pub mod jobs;
pub mod metals;
pub mod summary;

pub use customers::{
    CustomerAnalytics, CustomerAnalyticsRows, CustomerJobRow, CustomerRow, CustomerSegments,
    CustomerStanding,
};
pub use jobs::{
    JobDetail, JobListQuery, JobListRow, JobListView, JobSortField, SortDirection, StatusFilter,
};
pub use metals::{
    MetalAnalytics, MetalAnalyticsRows, MetalStats, MetalTypeBreakdown, MetalTypeRow,
    MetalUsageEntry, MetalUsageJob,
};
pub use summary::{DashboardSummary, JobSummaryRows, JobTotals, RecentJob, Trend};

/// `part / whole * 100`, or 0 when `whole` is 0
pub(crate) fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// `total / count`, or 0 when `count` is 0
pub(crate) fn average(total: f64, count: usize) -> f64 {
    if count > 0 {
        total / count as f64
    } else {
        0.0
    }
}
