use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{self, Request, StatusCode},
    Router,
};
use mockall::mock;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use salvage_content_store::memory::InMemoryContentStore;
use salvage_content_store::ContentPorts;
use salvage_core::{Category, Job, JobStatus, Reference};
use salvage_server::{
    api::build_router, EmailSender, OutgoingEmail, SalvageServer, ServerConfig, ServerError,
    ServerResult,
};

const ADMIN_KEY: &str = "test-admin-key";

// Mock the email provider
mock! {
    pub Mailer {}

    #[async_trait]
    impl EmailSender for Mailer {
        async fn send(&self, email: &OutgoingEmail) -> ServerResult<String>;
    }
}

impl std::fmt::Debug for MockMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockMailer").finish()
    }
}

struct TestContext {
    app: Router,
    content_store: Arc<InMemoryContentStore>,
}

fn test_config() -> ServerConfig {
    ServerConfig {
        port: 0,
        bind_address: "127.0.0.1".to_string(),
        content_store_url: "memory://test".to_string(),
        admin_api_key: Some(ADMIN_KEY.to_string()),
        ..Default::default()
    }
}

// Helper to set up a router over an in-memory store
fn setup_with(config: ServerConfig, mailer: MockMailer) -> TestContext {
    let content_store = Arc::new(InMemoryContentStore::new());
    let server = SalvageServer::new(
        config,
        ContentPorts::from_store(content_store.clone()),
        Arc::new(mailer),
    )
    .unwrap();

    TestContext {
        app: build_router(Arc::new(server)),
        content_store,
    }
}

fn setup() -> TestContext {
    setup_with(test_config(), MockMailer::new())
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(http::Method::POST)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn seed_categories(store: &InMemoryContentStore) {
    // electronics -> computers -> laptops
    store
        .upsert_category(Category::new("electronics", "Electronics").with_sub_category("computers"))
        .await;
    store
        .upsert_category(Category::new("computers", "Computers").with_sub_category("laptops"))
        .await;
    store.upsert_category(Category::new("laptops", "Laptops")).await;
}

fn job(id: &str, name: &str, status: JobStatus, date: &str, weight: f64, price: f64) -> Job {
    Job {
        id: id.to_string(),
        name: Some(name.to_string()),
        status,
        date_created: Some(date.to_string()),
        total_weight: Some(weight),
        total_purchase_price: Some(price),
        ..Default::default()
    }
}

async fn seed_jobs(store: &InMemoryContentStore) {
    store
        .upsert_job(job("job-1", "Office clear-out", JobStatus::Completed, "2024-01-10", 120.0, 300.0))
        .await;
    store
        .upsert_job(job("job-2", "School pickup", JobStatus::InProgress, "2024-02-01", 40.0, 80.0))
        .await;
    store
        .upsert_job(job("job-3", "Depot run", JobStatus::Completed, "2024-03-05", 260.0, 150.0))
        .await;
}

#[tokio::test]
async fn test_health_check() {
    let ctx = setup();

    let (status, body) = send(&ctx.app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
    assert_eq!(body["dependencies"]["contentStore"]["backend"], "memory");

    ctx.content_store.set_offline(true);
    let (status, body) = send(&ctx.app, Request::get("/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["dependencies"]["contentStore"]["status"], "DOWN");
}

#[tokio::test]
async fn test_validate_accepts_acyclic_edit() {
    let ctx = setup();
    seed_categories(&ctx.content_store).await;

    let (status, body) = send(
        &ctx.app,
        post_json(
            "/api/v1/categories/validate",
            json!({
                "documentId": "drafts.laptops",
                "subCategories": [{"_type": "reference", "_ref": "accessories", "_key": "k1"}]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"valid": true}));
}

#[tokio::test]
async fn test_validate_rejects_cycle_through_drafts() {
    let ctx = setup();
    seed_categories(&ctx.content_store).await;

    // Making electronics a child of laptops would close the loop
    let (status, body) = send(
        &ctx.app,
        post_json(
            "/api/v1/categories/validate",
            json!({
                "documentId": "drafts.laptops",
                "subCategories": [{"_type": "reference", "_ref": "electronics"}]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "valid": false,
            "errors": ["Circular sub-category relationships are not allowed"]
        })
    );
}

#[tokio::test]
async fn test_validate_rejects_self_and_duplicates() {
    let ctx = setup();
    seed_categories(&ctx.content_store).await;

    let (_, body) = send(
        &ctx.app,
        post_json(
            "/api/v1/categories/validate",
            json!({
                "documentId": "computers",
                "subCategories": [{"_ref": "drafts.computers"}]
            }),
        ),
    )
    .await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"][0], "A category cannot include itself as a sub-category");

    let (_, body) = send(
        &ctx.app,
        post_json(
            "/api/v1/categories/validate",
            json!({
                "documentId": "electronics",
                "subCategories": [{"_ref": "laptops"}, {"_ref": "drafts.laptops"}]
            }),
        ),
    )
    .await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["errors"][0], "Sub-categories must be unique");
}

#[tokio::test]
async fn test_validate_when_store_unreachable() {
    // Default policy lets the edit through
    let ctx = setup();
    seed_categories(&ctx.content_store).await;
    ctx.content_store.set_offline(true);

    let request = json!({
        "documentId": "laptops",
        "subCategories": [{"_ref": "electronics"}]
    });

    let (status, body) = send(&ctx.app, post_json("/api/v1/categories/validate", request.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"valid": true}));

    // Fail-closed refuses it
    let mut config = test_config();
    config.category_validation_policy = "fail-closed".to_string();
    let ctx = setup_with(config, MockMailer::new());
    ctx.content_store.set_offline(true);

    let (_, body) = send(&ctx.app, post_json("/api/v1/categories/validate", request)).await;
    assert_eq!(
        body,
        json!({
            "valid": false,
            "errors": ["Sub-category validation is temporarily unavailable"]
        })
    );
}

#[tokio::test]
async fn test_list_categories() {
    let ctx = setup();
    seed_categories(&ctx.content_store).await;
    ctx.content_store
        .upsert_category(Category {
            id: "unnamed".to_string(),
            ..Default::default()
        })
        .await;

    let (status, body) = send(&ctx.app, Request::get("/api/v1/categories").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 3);
    assert_eq!(categories[0]["name"], "Electronics");
    assert_eq!(categories[0]["slug"], "electronics");
    assert_eq!(categories[0]["subCategories"][0]["name"], "Computers");
}

#[tokio::test]
async fn test_admin_routes_require_token() {
    let ctx = setup();

    let (status, body) = send(&ctx.app, admin_get("/api/v1/admin/dashboard/summary", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorDetails"]["errorCode"], "ERR_UNAUTHORIZED");

    let (status, _) = send(&ctx.app, admin_get("/api/v1/admin/dashboard/summary", Some("wrong-key"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&ctx.app, admin_get("/api/v1/admin/dashboard/summary", Some(ADMIN_KEY))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_closed_without_configured_key() {
    let mut config = test_config();
    config.admin_api_key = None;
    let ctx = setup_with(config, MockMailer::new());

    let (status, _) = send(&ctx.app, admin_get("/api/v1/admin/dashboard/summary", Some(""))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dashboard_summary() {
    let ctx = setup();
    seed_jobs(&ctx.content_store).await;

    let (status, body) = send(&ctx.app, admin_get("/api/v1/admin/dashboard/summary", Some(ADMIN_KEY))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalJobs"], 3);
    assert_eq!(body["completedJobs"], 2);
    assert_eq!(body["totalWeight"], 420.0);
    assert_eq!(body["totalRevenue"], 530.0);
    assert_eq!(body["recentJobs"][0]["_id"], "job-3");
}

#[tokio::test]
async fn test_dashboard_job_list_filter_and_sort() {
    let ctx = setup();
    seed_jobs(&ctx.content_store).await;

    let (status, body) = send(
        &ctx.app,
        admin_get(
            "/api/v1/admin/dashboard/jobs?status=completed&sort=totalWeight&direction=asc",
            Some(ADMIN_KEY),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["caption"], "Showing 2 of 3 jobs");
    let ids: Vec<&str> = body["jobs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|j| j["_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["job-1", "job-3"]);

    let (status, body) = send(
        &ctx.app,
        admin_get("/api/v1/admin/dashboard/jobs?sort=colour", Some(ADMIN_KEY)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorDetails"]["errorCode"], "ERR_BAD_REQUEST");
}

#[tokio::test]
async fn test_dashboard_job_detail() {
    let ctx = setup();
    seed_jobs(&ctx.content_store).await;

    let (status, body) = send(&ctx.app, admin_get("/api/v1/admin/dashboard/jobs/job-2", Some(ADMIN_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "School pickup");
    assert_eq!(body["status"], "in-progress");

    let (status, body) = send(&ctx.app, admin_get("/api/v1/admin/dashboard/jobs/nope", Some(ADMIN_KEY))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Job nope not found");
}

#[tokio::test]
async fn test_dashboard_analytics_routes() {
    let ctx = setup();
    seed_jobs(&ctx.content_store).await;
    let mut linked = job("job-4", "Repeat pickup", JobStatus::Completed, "2024-04-01", 10.0, 20.0);
    linked.customer = vec![Reference::to("customer-1")];
    ctx.content_store.upsert_job(linked).await;

    let (status, body) = send(&ctx.app, admin_get("/api/v1/admin/dashboard/metals", Some(ADMIN_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topMetals"], json!([]));

    let (status, body) = send(&ctx.app, admin_get("/api/v1/admin/dashboard/customers", Some(ADMIN_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCustomers"], 0);
}

#[tokio::test]
async fn test_dashboard_store_failure() {
    let ctx = setup();
    ctx.content_store.set_offline(true);

    let (status, body) = send(&ctx.app, admin_get("/api/v1/admin/dashboard/summary", Some(ADMIN_KEY))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["errorDetails"]["errorCode"], "ERR_CONTENT_STORE_ERROR");
}

#[tokio::test]
async fn test_pickup_request_validation_errors() {
    let ctx = setup();

    let (status, body) = send(
        &ctx.app,
        post_json("/api/send", json!({"email": "not-an-email", "phone": "call me"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["fieldErrors"],
        json!({
            "email": ["Invalid email address", "Email must be a valid format"],
            "phone": ["Invalid contact number"]
        })
    );
}

#[tokio::test]
async fn test_pickup_request_sent() {
    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .withf(|email| {
            email.subject == "Let us pickup your e-waste!"
                && email.reply_to.as_deref() == Some("jane@example.ca")
                && email.to == vec!["admin@e-waste-pickup.ca".to_string()]
        })
        .times(1)
        .returning(|_| Ok("email-42".to_string()));
    let ctx = setup_with(test_config(), mailer);

    let (status, body) = send(
        &ctx.app,
        post_json("/api/send", json!({"email": "jane@example.ca", "phone": "613-555-0100"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": {"id": "email-42"}}));
}

#[tokio::test]
async fn test_newsletter_delivery_failure() {
    let mut mailer = MockMailer::new();
    mailer
        .expect_send()
        .times(1)
        .returning(|_| Err(ServerError::EmailDeliveryError("provider down".to_string())));
    let ctx = setup_with(test_config(), mailer);

    let (status, body) = send(
        &ctx.app,
        post_json("/api/v1/newsletter", json!({"email": "reader@example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["errorDetails"]["errorCode"], "ERR_EMAIL_DELIVERY_ERROR");
}

#[tokio::test]
async fn test_newsletter_missing_email() {
    let ctx = setup();

    let (status, body) = send(&ctx.app, post_json("/api/v1/newsletter", json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fieldErrors"]["email"], json!(["Required"]));
}

#[tokio::test]
async fn test_unknown_route() {
    let ctx = setup();

    let (status, body) = send(&ctx.app, Request::get("/nowhere").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errorDetails"]["errorCode"], "ERR_NOT_FOUND");
}
