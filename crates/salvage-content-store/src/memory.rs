//! In-memory content store
//!
//! Holds documents in memory and answers the query ports with the same
//! projections the hosted queries produce. Intended for development and tests.
//! All data is lost when the instance is dropped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use salvage_core::analytics::customers::CustomerJobRow;
use salvage_core::analytics::jobs::{
    JobBlogLink, JobCustomer, JobDetailEntry, JobDetailMetal, JobProcessLink,
};
use salvage_core::analytics::metals::{MetalUsageEntry, UsedMetal};
use salvage_core::analytics::{
    CustomerAnalyticsRows, CustomerRow, JobDetail, JobListRow, JobSummaryRows, JobTotals,
    MetalAnalyticsRows, MetalTypeRow, MetalUsageJob, RecentJob,
};
use salvage_core::domain::category::{Slug, SlugValue};
use salvage_core::domain::documents::{Customer, Metal, MetalStatus, MetalUnit, Process};
use salvage_core::{
    Category, CategoryGraphSource, CategoryListing, CategoryNode, CategoryQueries, CoreError,
    DashboardQueries, Job, JobStatus, Reference,
};

use crate::{ContentStore, ContentStoreError, ContentStoreResult};

/// A blog post, kept only for its category references
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    /// Document id
    #[serde(rename = "_id")]
    pub id: String,
    /// Title
    #[serde(default)]
    pub title: Option<String>,
    /// Slug
    #[serde(default)]
    pub slug: Option<Slug>,
    /// Categories the post is filed under
    #[serde(default)]
    pub categories: Vec<Reference>,
}

/// A document and its creation order
#[derive(Debug, Clone)]
struct Stored<T> {
    created: u64,
    doc: T,
}

type Collection<T> = Arc<RwLock<HashMap<String, Stored<T>>>>;

/// In-memory implementation of the content store
#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    categories: Collection<Category>,
    jobs: Collection<Job>,
    customers: Collection<Customer>,
    metals: Collection<Metal>,
    processes: Collection<Process>,
    blog_posts: Collection<BlogPost>,
    sequence: Arc<AtomicU64>,
    offline: Arc<AtomicBool>,
}

fn newest_first<T: Clone>(map: &HashMap<String, Stored<T>>) -> Vec<T> {
    let mut stored: Vec<&Stored<T>> = map.values().collect();
    stored.sort_by(|a, b| b.created.cmp(&a.created));
    stored.into_iter().map(|s| s.doc.clone()).collect()
}

fn oldest_first<T: Clone>(map: &HashMap<String, Stored<T>>) -> Vec<T> {
    let mut docs = newest_first(map);
    docs.reverse();
    docs
}

fn references(refs: &[Reference], id: &str) -> bool {
    refs.iter().any(|r| r.target_id.as_deref() == Some(id))
}

fn job_references(job: &Job, id: &str) -> bool {
    references(&job.customer, id)
        || references(&job.related_blog_posts, id)
        || references(&job.processes, id)
        || job
            .metals
            .iter()
            .any(|m| m.metal.as_ref().and_then(|r| r.target_id.as_deref()) == Some(id))
}

fn listing(
    category: &Category,
    categories: &HashMap<String, Stored<Category>>,
    posts: &HashMap<String, Stored<BlogPost>>,
    nested: bool,
) -> CategoryListing {
    let post_count = posts
        .values()
        .filter(|p| references(&p.doc.categories, &category.id))
        .count() as u64;

    // one level of sub-categories, dangling references stay as gaps
    let sub_categories = if nested {
        category
            .sub_categories
            .iter()
            .map(|r| {
                let child = categories.get(r.target_id.as_deref()?)?;
                Some(listing(&child.doc, categories, posts, false))
            })
            .collect()
    } else {
        Vec::new()
    };

    CategoryListing {
        id: category.id.clone(),
        name: category.name.clone(),
        slug: category.slug.clone().map(SlugValue::Object),
        description: category.description.clone(),
        post_count,
        sub_categories,
    }
}

impl InMemoryContentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an unreachable store. Every query fails while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> ContentStoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ContentStoreError::Unavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }

    async fn upsert<T>(&self, collection: &Collection<T>, id: String, doc: T) {
        let mut store = collection.write().await;
        let created = store
            .get(&id)
            .map(|s| s.created)
            .unwrap_or_else(|| self.sequence.fetch_add(1, Ordering::SeqCst));
        store.insert(id, Stored { created, doc });
    }

    /// Insert or replace a category
    pub async fn upsert_category(&self, category: Category) {
        debug!(id = %category.id, "Storing category");
        self.upsert(&self.categories, category.id.clone(), category).await;
    }

    /// Insert or replace a job
    pub async fn upsert_job(&self, job: Job) {
        debug!(id = %job.id, "Storing job");
        self.upsert(&self.jobs, job.id.clone(), job).await;
    }

    /// Insert or replace a customer
    pub async fn upsert_customer(&self, customer: Customer) {
        self.upsert(&self.customers, customer.id.clone(), customer).await;
    }

    /// Insert or replace a metal
    pub async fn upsert_metal(&self, metal: Metal) {
        self.upsert(&self.metals, metal.id.clone(), metal).await;
    }

    /// Insert or replace a process
    pub async fn upsert_process(&self, process: Process) {
        self.upsert(&self.processes, process.id.clone(), process).await;
    }

    /// Insert or replace a blog post
    pub async fn upsert_blog_post(&self, post: BlogPost) {
        self.upsert(&self.blog_posts, post.id.clone(), post).await;
    }

    /// Remove a category
    pub async fn delete_category(&self, id: &str) -> ContentStoreResult<()> {
        self.categories
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ContentStoreError::NotFound(id.to_string()))
    }

    async fn job_customers(&self, job: &Job, detailed: bool) -> Vec<Option<JobCustomer>> {
        let customers = self.customers.read().await;
        job.customer
            .iter()
            .map(|r| {
                let customer = &customers.get(r.target_id.as_deref()?)?.doc;
                Some(JobCustomer {
                    id: customer.id.clone(),
                    name: customer.name.clone(),
                    company_name: None,
                    email: customer.email.clone(),
                    phone: customer.phone.clone(),
                    address: customer.address.clone().filter(|_| detailed),
                    notes: customer.notes.clone().filter(|_| detailed),
                })
            })
            .collect()
    }
}

fn status_count(jobs: &[Job], status: JobStatus) -> u64 {
    jobs.iter().filter(|j| j.status == status).count() as u64
}

fn unit_str(unit: MetalUnit) -> &'static str {
    match unit {
        MetalUnit::Lbs => "lbs",
        MetalUnit::Kg => "kg",
        MetalUnit::Tons => "tons",
    }
}

#[async_trait]
impl CategoryGraphSource for InMemoryContentStore {
    async fn fetch_category_graph(&self) -> Result<Vec<CategoryNode>, CoreError> {
        self.ensure_online()?;
        let categories = self.categories.read().await;
        Ok(oldest_first(&*categories)
            .into_iter()
            .map(|c| CategoryNode {
                id: c.id,
                sub_categories: c.sub_categories.into_iter().map(|r| r.target_id).collect(),
            })
            .collect())
    }
}

#[async_trait]
impl CategoryQueries for InMemoryContentStore {
    async fn list_categories(&self) -> Result<Vec<Option<CategoryListing>>, CoreError> {
        self.ensure_online()?;
        let categories = self.categories.read().await;
        let posts = self.blog_posts.read().await;
        Ok(oldest_first(&*categories)
            .iter()
            .map(|c| Some(listing(c, &categories, &posts, true)))
            .collect())
    }
}

#[async_trait]
impl DashboardQueries for InMemoryContentStore {
    async fn job_summary(&self) -> Result<JobSummaryRows, CoreError> {
        self.ensure_online()?;
        let jobs = newest_first(&*self.jobs.read().await);

        Ok(JobSummaryRows {
            total_jobs: jobs.len() as u64,
            completed_jobs: status_count(&jobs, JobStatus::Completed),
            in_progress_jobs: status_count(&jobs, JobStatus::InProgress),
            cancelled_jobs: status_count(&jobs, JobStatus::Cancelled),
            all_jobs: jobs
                .iter()
                .map(|j| JobTotals {
                    total_weight: j.total_weight,
                    total_purchase_price: j.total_purchase_price,
                })
                .collect(),
            recent_jobs: jobs
                .iter()
                .take(5)
                .map(|j| RecentJob {
                    id: j.id.clone(),
                    name: j.name.clone(),
                    job_id: j.job_id.clone(),
                    status: Some(j.status.to_string()),
                    total_weight: j.total_weight,
                    total_purchase_price: j.total_purchase_price,
                    date_created: j.date_created.clone(),
                    customer_count: j.customer.len() as u64,
                })
                .collect(),
        })
    }

    async fn job_list(&self) -> Result<Vec<JobListRow>, CoreError> {
        self.ensure_online()?;
        let jobs = newest_first(&*self.jobs.read().await);

        let mut rows = Vec::with_capacity(jobs.len());
        for job in jobs {
            rows.push(JobListRow {
                customers: self.job_customers(&job, false).await,
                id: job.id,
                name: job.name,
                job_id: job.job_id,
                description: job.description,
                status: Some(job.status.to_string()),
                total_weight: job.total_weight,
                total_purchase_price: job.total_purchase_price,
                date_created: job.date_created,
                date_completed: job.date_completed,
                metal_count: job.metals.len() as u64,
                process_count: job.processes.len() as u64,
                image_count: 0,
            });
        }
        Ok(rows)
    }

    async fn job_detail(&self, id: &str) -> Result<Option<JobDetail>, CoreError> {
        self.ensure_online()?;
        let Some(job) = self.jobs.read().await.get(id).map(|s| s.doc.clone()) else {
            return Ok(None);
        };

        let metals = self.metals.read().await.clone();
        let entries = job
            .metals
            .iter()
            .map(|entry| JobDetailEntry {
                key: entry.key.clone(),
                weight: entry.weight,
                purchase_price: entry.purchase_price,
                notes: entry.notes.clone(),
                metal: entry
                    .metal
                    .as_ref()
                    .and_then(|r| metals.get(r.target_id.as_deref()?))
                    .map(|m| JobDetailMetal {
                        id: m.doc.id.clone(),
                        name: m.doc.name.clone(),
                        kind: m.doc.kind.map(|k| k.as_str().to_string()),
                        current_price_per_pound: m.doc.current_price_per_pound,
                        unit: Some(unit_str(m.doc.unit).to_string()),
                    }),
            })
            .collect();

        let processes = {
            let stored = self.processes.read().await;
            job.processes
                .iter()
                .map(|r| {
                    let process = &stored.get(r.target_id.as_deref()?)?.doc;
                    Some(JobProcessLink {
                        id: process.id.clone(),
                        name: process.name.clone(),
                        description: process.description.clone(),
                    })
                })
                .collect()
        };

        let related_blog_posts = {
            let stored = self.blog_posts.read().await;
            job.related_blog_posts
                .iter()
                .map(|r| {
                    let post = &stored.get(r.target_id.as_deref()?)?.doc;
                    Some(JobBlogLink {
                        id: post.id.clone(),
                        title: post.title.clone(),
                        slug: post.slug.as_ref().and_then(|s| s.value()).map(str::to_string),
                    })
                })
                .collect()
        };

        Ok(Some(JobDetail {
            customers: self.job_customers(&job, true).await,
            id: job.id,
            name: job.name,
            job_id: job.job_id,
            description: job.description,
            status: Some(job.status.to_string()),
            total_weight: job.total_weight,
            total_purchase_price: job.total_purchase_price,
            date_created: job.date_created,
            date_completed: job.date_completed,
            metals: entries,
            processes,
            related_blog_posts,
        }))
    }

    async fn metal_analytics(&self) -> Result<MetalAnalyticsRows, CoreError> {
        self.ensure_online()?;
        let metals = self.metals.read().await;
        let jobs = newest_first(&*self.jobs.read().await);

        let metal_types = oldest_first(&*metals)
            .into_iter()
            .map(|m| MetalTypeRow {
                id: m.id,
                name: m.name,
                kind: m.kind.map(|k| k.as_str().to_string()),
                current_price_per_pound: m.current_price_per_pound,
                unit: Some(unit_str(m.unit).to_string()),
                is_active: Some(
                    match m.status {
                        MetalStatus::Active => "active",
                        MetalStatus::Inactive => "inactive",
                    }
                    .to_string(),
                ),
            })
            .collect();

        let metal_usage = jobs
            .iter()
            .filter(|j| !j.metals.is_empty())
            .map(|j| MetalUsageJob {
                metals: j
                    .metals
                    .iter()
                    .map(|entry| MetalUsageEntry {
                        metal: entry
                            .metal
                            .as_ref()
                            .and_then(|r| metals.get(r.target_id.as_deref()?))
                            .map(|m| UsedMetal {
                                id: m.doc.id.clone(),
                                name: m.doc.name.clone(),
                                kind: m.doc.kind.map(|k| k.as_str().to_string()),
                            }),
                        weight: entry.weight,
                        purchase_price: entry.purchase_price,
                    })
                    .collect(),
            })
            .collect();

        Ok(MetalAnalyticsRows {
            metal_types,
            metal_usage,
        })
    }

    async fn customer_analytics(&self) -> Result<CustomerAnalyticsRows, CoreError> {
        self.ensure_online()?;
        let customers = oldest_first(&*self.customers.read().await);
        let jobs = newest_first(&*self.jobs.read().await);

        let mut rows: Vec<CustomerRow> = customers
            .into_iter()
            .map(|customer| {
                let mut own: Vec<&Job> = jobs.iter().filter(|j| job_references(j, &customer.id)).collect();
                // dateCreated desc, undated last
                own.sort_by(|a, b| b.date_created.cmp(&a.date_created));

                CustomerRow {
                    job_count: own.len() as u64,
                    jobs: own
                        .iter()
                        .map(|j| {
                            Some(CustomerJobRow {
                                total_purchase_price: j.total_purchase_price,
                                date_created: j.date_created.clone(),
                            })
                        })
                        .collect(),
                    id: customer.id,
                    name: customer.name,
                    company_name: None,
                    email: customer.email,
                }
            })
            .collect();

        let total_customers = rows.len() as u64;
        let customers_with_jobs = rows.iter().filter(|r| r.job_count > 0).count() as u64;

        rows.sort_by(|a, b| b.job_count.cmp(&a.job_count));
        rows.truncate(10);

        Ok(CustomerAnalyticsRows {
            total_customers,
            customers_with_jobs,
            top_customers: rows,
        })
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn ping(&self) -> ContentStoreResult<()> {
        self.ensure_online()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use salvage_core::domain::documents::{MetalEntry, MetalType};
    use salvage_core::{SubCategoryInput, ValidationOutcome};

    fn job(id: &str, status: JobStatus, customer: Option<&str>, date: &str, price: f64) -> Job {
        Job {
            id: id.to_string(),
            name: Some(format!("Job {}", id)),
            status,
            date_created: Some(date.to_string()),
            total_purchase_price: Some(price),
            total_weight: Some(price / 2.0),
            customer: customer.map(Reference::to).into_iter().collect(),
            ..Default::default()
        }
    }

    fn customer(id: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: Some(id.to_uppercase()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_category_graph_and_listing() {
        let store = InMemoryContentStore::new();
        store
            .upsert_category(Category::new("metals", "Metals").with_sub_category("copper").with_sub_category("ghost"))
            .await;
        store.upsert_category(Category::new("copper", "Copper")).await;
        store
            .upsert_blog_post(BlogPost {
                id: "post-1".to_string(),
                categories: vec![Reference::to("copper")],
                ..Default::default()
            })
            .await;

        let graph = store.fetch_category_graph().await.unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph[0].id, "metals");
        assert_eq!(
            graph[0].sub_categories,
            vec![Some("copper".to_string()), Some("ghost".to_string())]
        );

        let listing = store.list_categories().await.unwrap();
        let metals = listing[0].as_ref().unwrap();
        assert_eq!(metals.post_count, 0);
        assert_eq!(metals.sub_categories.len(), 2);
        assert_eq!(metals.sub_categories[0].as_ref().unwrap().post_count, 1);
        assert!(metals.sub_categories[1].is_none());
    }

    #[tokio::test]
    async fn test_offline_store_fails_queries() {
        let store = InMemoryContentStore::new();
        store.set_offline(true);

        let err = store.fetch_category_graph().await.unwrap_err();
        assert!(err.is_infrastructure());
        assert!(store.ping().await.is_err());

        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_category() {
        let store = InMemoryContentStore::new();
        store.upsert_category(Category::new("a", "A")).await;

        assert!(store.delete_category("a").await.is_ok());
        assert!(matches!(
            store.delete_category("a").await,
            Err(ContentStoreError::NotFound(_))
        ));
        assert!(store.fetch_category_graph().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validator_over_memory_store() {
        let store = Arc::new(InMemoryContentStore::new());
        store.upsert_category(Category::new("a", "A").with_sub_category("b")).await;
        store.upsert_category(Category::new("b", "B").with_sub_category("c")).await;
        store.upsert_category(Category::new("c", "C")).await;

        let refs = vec![Reference::to("a")];
        let input = SubCategoryInput::new(Some("drafts.c"), Some(&refs));
        let outcome = salvage_core::validation::check_sub_categories(store.as_ref(), &input)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ValidationOutcome::Rejected(salvage_core::CategoryRejection::CircularReference)
        );
    }

    #[tokio::test]
    async fn test_job_summary_and_list_order() {
        let store = InMemoryContentStore::new();
        store.upsert_job(job("j1", JobStatus::Completed, Some("c1"), "2024-01-01", 100.0)).await;
        store.upsert_job(job("j2", JobStatus::InProgress, None, "2024-02-01", 50.0)).await;
        store.upsert_job(job("j3", JobStatus::Completed, Some("c1"), "2024-03-01", 25.0)).await;
        // replacing keeps the original creation order
        store.upsert_job(job("j1", JobStatus::Cancelled, Some("c1"), "2024-01-01", 100.0)).await;

        let summary = store.job_summary().await.unwrap();
        assert_eq!(summary.total_jobs, 3);
        assert_eq!(summary.completed_jobs, 1);
        assert_eq!(summary.cancelled_jobs, 1);
        let recent: Vec<&str> = summary.recent_jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(recent, vec!["j3", "j2", "j1"]);
        assert_eq!(summary.recent_jobs[0].customer_count, 1);

        let list = store.job_list().await.unwrap();
        assert_eq!(list[0].id, "j3");
        assert_eq!(list[2].status.as_deref(), Some("cancelled"));
        // customer c1 is not stored, so the reference dangles
        assert_eq!(list[0].customers, vec![None]);
    }

    #[tokio::test]
    async fn test_job_detail_expands_metals() {
        let store = InMemoryContentStore::new();
        store
            .upsert_metal(Metal {
                id: "cu".to_string(),
                name: Some("Copper".to_string()),
                kind: Some(MetalType::NonFerrous),
                current_price_per_pound: Some(3.5),
                ..Default::default()
            })
            .await;
        let mut pickup = job("j1", JobStatus::InProgress, None, "2024-01-01", 0.0);
        pickup.metals = vec![MetalEntry {
            metal: Some(Reference::to("cu")),
            weight: Some(4.0),
            purchase_price: Some(14.0),
            ..Default::default()
        }];
        store.upsert_job(pickup).await;

        store
            .upsert_process(Process {
                id: "p1".to_string(),
                name: Some("Stripping".to_string()),
                ..Default::default()
            })
            .await;
        store
            .upsert_blog_post(BlogPost {
                id: "post-1".to_string(),
                title: Some("Copper prices".to_string()),
                slug: Some(Slug::new("copper-prices")),
                categories: Vec::new(),
            })
            .await;
        let mut pickup = store.jobs.read().await.get("j1").unwrap().doc.clone();
        pickup.processes = vec![Reference::to("p1"), Reference::to("p-missing")];
        pickup.related_blog_posts = vec![Reference::to("post-1")];
        store.upsert_job(pickup).await;

        let detail = store.job_detail("j1").await.unwrap().unwrap();
        assert_eq!(
            detail.processes[0].as_ref().and_then(|p| p.name.as_deref()),
            Some("Stripping")
        );
        assert!(detail.processes[1].is_none());
        assert_eq!(
            detail.related_blog_posts[0].as_ref().and_then(|p| p.slug.as_deref()),
            Some("copper-prices")
        );
        let metal = detail.metals[0].metal.as_ref().unwrap();
        assert_eq!(metal.kind.as_deref(), Some("non-ferrous"));
        assert_eq!(metal.unit.as_deref(), Some("lbs"));
        assert!(store.job_detail("nope").await.unwrap().is_none());

        let analytics = store.metal_analytics().await.unwrap();
        assert_eq!(analytics.metal_types.len(), 1);
        assert_eq!(analytics.metal_usage.len(), 1);
    }

    #[tokio::test]
    async fn test_customer_analytics_rows() {
        let store = InMemoryContentStore::new();
        store.upsert_customer(customer("c1")).await;
        store.upsert_customer(customer("c2")).await;
        store.upsert_customer(customer("c3")).await;
        store.upsert_job(job("j1", JobStatus::Completed, Some("c2"), "2024-01-01", 10.0)).await;
        store.upsert_job(job("j2", JobStatus::Completed, Some("c2"), "2024-03-01", 20.0)).await;
        store.upsert_job(job("j3", JobStatus::Completed, Some("c3"), "2024-02-01", 30.0)).await;

        let rows = store.customer_analytics().await.unwrap();
        assert_eq!(rows.total_customers, 3);
        assert_eq!(rows.customers_with_jobs, 2);
        assert_eq!(rows.top_customers[0].id, "c2");
        assert_eq!(rows.top_customers[0].job_count, 2);
        assert_eq!(
            rows.top_customers[0].jobs[0].as_ref().and_then(|j| j.date_created.as_deref()),
            Some("2024-03-01")
        );
        assert_eq!(rows.top_customers[2].id, "c1");
    }
}
