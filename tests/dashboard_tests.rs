//! Integration tests for the dashboard router.
//!
//! Requests are driven straight through the axum router with
//! `tower::ServiceExt::oneshot`, backed by a seeded in-memory store.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use task_board::dashboard::{DashboardServer, build_router};
use task_board::db::Database;
use task_board::db::import::Snapshot;
use task_board::error::{RetrievalError, RetrievalResult};
use task_board::store::TaskStore;
use task_board::store::query::TableQuery;
use tower::ServiceExt;

const SEED: &str = include_str!("../demos/seed.json");

fn seeded_router() -> axum::Router {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    db.import_snapshot(&Snapshot::from_json(SEED).unwrap(), false)
        .unwrap();
    build_router(DashboardServer::new(Arc::new(db)))
}

struct DownStore;

#[async_trait]
impl TaskStore for DownStore {
    async fn select(&self, query: &TableQuery) -> RetrievalResult<Vec<Value>> {
        Err(RetrievalError::new(query.table, "permission denied for table tasks"))
    }
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn index_renders_form_and_loading_placeholder() {
    let (status, _, body) = get(seeded_router(), "/?priority=high&search=q3").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#"id="filter-form""#));
    assert!(body.contains(r#"<option value="high" selected>High</option>"#));
    assert!(body.contains("Loading tasks..."));
    assert!(body.contains(r#"hx-get="/api/tasks/list?search=q3&amp;priority=high""#));
}

#[tokio::test]
async fn list_fragment_renders_matching_tasks() {
    let (status, headers, body) =
        get(seeded_router(), "/api/tasks/list?search=budget&priority=&status=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.matches("<article").count(), 3);
    assert!(body.contains("Q3 Budget Review"));
    assert!(body.contains("3 tasks found"));
    assert!(body.contains(r#"hx-swap-oob="true""#));
    assert_eq!(headers.get("hx-push-url").unwrap(), "/?search=budget");
}

#[tokio::test]
async fn list_fragment_shows_placeholder_when_empty() {
    let (_, _, body) = get(seeded_router(), "/api/tasks/list?status=archived").await;

    assert!(body.contains("No tasks found"));
    assert!(!body.contains("<article"));
}

#[tokio::test]
async fn unknown_priority_narrows_instead_of_widening() {
    let (_, headers, body) = get(seeded_router(), "/api/tasks/list?priority=urgent").await;

    assert!(body.contains("No tasks found"));
    assert!(!body.contains("<article"));
    assert_eq!(headers.get("hx-push-url").unwrap(), "/?priority=urgent");
}

#[tokio::test]
async fn list_fragment_shows_store_error() {
    let router = build_router(DashboardServer::new(Arc::new(DownStore)));
    let (status, _, body) = get(router, "/api/tasks/list").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("permission denied for table tasks"));
    assert!(body.contains("No tasks found"));
}

#[tokio::test]
async fn json_tasks_respect_filters_and_order() {
    let (status, _, body) = get(seeded_router(), "/api/tasks?ordering=-priority").await;
    assert_eq!(status, StatusCode::OK);

    let tasks: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(tasks.len(), 8);
    assert_eq!(tasks[0]["priority"], "low");
    assert_eq!(tasks[7]["priority"], "high");
}

#[tokio::test]
async fn json_error_is_bad_gateway_with_message() {
    let router = build_router(DashboardServer::new(Arc::new(DownStore)));
    let (status, _, body) = get(router, "/api/tasks").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"], "permission denied for table tasks");
}

#[tokio::test]
async fn json_comments_and_attachments() {
    let (_, _, body) = get(seeded_router(), "/api/tasks/t-01/comments").await;
    let comments: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["rowguid"], "c-01");

    let (_, _, body) = get(seeded_router(), "/api/tasks/t-01/attachments").await;
    let attachments: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(attachments[0]["filename"], "notes.pdf");
}

#[tokio::test]
async fn task_detail_page_and_not_found() {
    let (status, _, body) = get(seeded_router(), "/tasks/t-01").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Q3 Budget Review"));
    assert!(body.contains("Comments (2)"));
    assert!(body.contains("q3-budget.xlsx"));

    let (status, _, body) = get(seeded_router(), "/tasks/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Task not found"));
}

#[tokio::test]
async fn health_reports_version() {
    let (status, _, body) = get(seeded_router(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}
