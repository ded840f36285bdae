//! Customer engagement

use serde::{Deserialize, Serialize};

use super::{average, percentage};
use crate::domain::null_as_default;

/// A job belonging to a customer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerJobRow {
    /// Amount paid
    #[serde(default)]
    pub total_purchase_price: Option<f64>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub date_created: Option<String>,
}

/// A customer with the jobs referencing it, newest first
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    #[serde(default)]
    pub name: Option<String>,
    /// Company
    #[serde(default)]
    pub company_name: Option<String>,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Number of jobs referencing the customer
    #[serde(default, deserialize_with = "null_as_default")]
    pub job_count: u64,
    /// Jobs ordered by creation date, newest first
    #[serde(default, deserialize_with = "null_as_default")]
    pub jobs: Vec<Option<CustomerJobRow>>,
}

/// Result of the customer analytics query
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAnalyticsRows {
    /// All customers
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_customers: u64,
    /// Customers referenced by at least one job
    #[serde(default, deserialize_with = "null_as_default")]
    pub customers_with_jobs: u64,
    /// Up to ten customers with the most jobs
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_customers: Vec<CustomerRow>,
}

/// A top customer with computed totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStanding {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Name
    pub name: Option<String>,
    /// Company
    pub company_name: Option<String>,
    /// Email
    pub email: Option<String>,
    /// Number of jobs
    pub job_count: u64,
    /// Sum of job purchase prices
    pub total_spent: f64,
    /// Creation date of the newest job
    pub last_job_date: Option<String>,
    /// Total spent relative to the top spender, in percent
    pub share_of_top: f64,
}

/// Customer counts by job frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSegments {
    /// Five jobs or more
    pub frequent: usize,
    /// Two to four jobs
    pub regular: usize,
    /// Exactly one job
    pub one_time: usize,
}

/// Customer analytics panel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerAnalytics {
    /// All customers
    pub total_customers: u64,
    /// Customers with at least one job
    pub customers_with_jobs: u64,
    /// Customers with jobs over all customers, in percent
    pub engagement_rate: f64,
    /// Jobs of the listed customers per active customer
    pub average_jobs_per_customer: f64,
    /// Spend of the listed customers per active customer
    pub average_spent_per_customer: f64,
    /// Frequency segments over the listed customers
    pub segments: CustomerSegments,
    /// Largest total spent among the listed customers
    pub highest_spent: f64,
    /// Largest job count among the listed customers
    pub most_jobs: u64,
    /// Mean total spent of the listed customers
    pub average_spent: f64,
    /// Listed customers with totals
    pub customers: Vec<CustomerStanding>,
}

impl CustomerAnalytics {
    /// Compute the panel from the query result
    pub fn from_rows(rows: CustomerAnalyticsRows) -> Self {
        let mut customers: Vec<CustomerStanding> = rows
            .top_customers
            .into_iter()
            .map(|row| {
                let total_spent = row
                    .jobs
                    .iter()
                    .flatten()
                    .filter_map(|job| job.total_purchase_price)
                    .sum();
                let last_job_date = row
                    .jobs
                    .first()
                    .and_then(|job| job.as_ref())
                    .and_then(|job| job.date_created.clone());

                CustomerStanding {
                    id: row.id,
                    name: row.name,
                    company_name: row.company_name,
                    email: row.email,
                    job_count: row.job_count,
                    total_spent,
                    last_job_date,
                    share_of_top: 0.0,
                }
            })
            .collect();

        let highest_spent = customers
            .iter()
            .map(|c| c.total_spent)
            .fold(0.0_f64, f64::max);
        let most_jobs = customers.iter().map(|c| c.job_count).max().unwrap_or(0);
        let listed_spent: f64 = customers.iter().map(|c| c.total_spent).sum();
        let listed_jobs: u64 = customers.iter().map(|c| c.job_count).sum();

        for customer in &mut customers {
            customer.share_of_top = percentage(customer.total_spent, highest_spent);
        }

        let segments = CustomerSegments {
            frequent: customers.iter().filter(|c| c.job_count >= 5).count(),
            regular: customers
                .iter()
                .filter(|c| (2..5).contains(&c.job_count))
                .count(),
            one_time: customers.iter().filter(|c| c.job_count == 1).count(),
        };

        let active = rows.customers_with_jobs as usize;

        Self {
            total_customers: rows.total_customers,
            customers_with_jobs: rows.customers_with_jobs,
            engagement_rate: percentage(rows.customers_with_jobs as f64, rows.total_customers as f64),
            average_jobs_per_customer: average(listed_jobs as f64, active),
            average_spent_per_customer: average(listed_spent, active),
            segments,
            highest_spent,
            most_jobs,
            average_spent: average(listed_spent, customers.len()),
            customers,
        }
    }
}
