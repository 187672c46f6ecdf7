//! HTTP server implementation for the web dashboard.
//!
//! This module provides the axum-based HTTP server that serves the task page,
//! the htmx fragments it swaps in, and JSON endpoints over the retrievals.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::{filter_bar, html_escape, task_detail, task_list, templates};
use crate::error::RetrievalError;
use crate::filters::{FilterParams, FilterSpec};
use crate::page::TaskPage;
use crate::store::TaskStore;
use crate::types::{Attachment, Comment, Task};

/// Dashboard server state shared across handlers.
#[derive(Clone)]
pub struct DashboardServer {
    /// Store the retrievals go to.
    store: Arc<dyn TaskStore>,
}

impl DashboardServer {
    /// Create a new dashboard server instance.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn TaskStore> {
        &self.store
    }
}

/// Health check response.
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(serde::Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

impl IntoResponse for RetrievalError {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: &self.message,
            }),
        )
            .into_response()
    }
}

fn query_suffix(filters: &FilterSpec) -> String {
    let qs = filters.to_query_string();
    if qs.is_empty() {
        String::new()
    } else {
        format!("?{}", qs)
    }
}

/// Root endpoint - the task page. The list itself loads via htmx.
async fn root(Query(params): Query<FilterParams>) -> Html<String> {
    let filters = FilterSpec::from(params);

    let body = templates::fill(
        templates::INDEX_TEMPLATE,
        &[
            ("filter_bar", filter_bar::render_filter_bar(&filters).as_str()),
            ("results_query", html_escape(&query_suffix(&filters)).as_str()),
            ("loading", task_list::render_loading().as_str()),
        ],
    );

    Html(templates::page("Tasks", &body))
}

/// Task list fragment (htmx). Runs one page load for the submitted filters
/// and pushes the matching page URL into the browser history.
async fn api_tasks_list(
    State(state): State<DashboardServer>,
    Query(params): Query<FilterParams>,
) -> impl IntoResponse {
    let filters = FilterSpec::from(params);
    let page = TaskPage::with_filters(Arc::clone(state.store()), filters.clone());
    let page_state = page.mount().await;

    let mut html = task_list::render_results(&page_state, Utc::now());
    html.push_str(&filter_bar::render_active_filters_oob(&filters));

    let push_url = format!("/{}", query_suffix(&filters));
    ([("hx-push-url", push_url)], Html(html))
}

/// Task detail page.
async fn task_detail_page(
    State(state): State<DashboardServer>,
    Path(task_id): Path<String>,
) -> (StatusCode, Html<String>) {
    let task = match state.store().fetch_task(&task_id).await {
        Ok(Some(task)) => task,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Html(task_detail::render_not_found(&task_id)),
            );
        }
        Err(e) => {
            warn!(task_id = %task_id, error = %e, "Failed to load task");
            return (
                StatusCode::BAD_GATEWAY,
                Html(task_detail::render_load_error(&e.message)),
            );
        }
    };

    let (comments, attachments) = tokio::join!(
        state.store().fetch_task_comments(&task_id),
        state.store().fetch_task_attachments(&task_id),
    );

    (
        StatusCode::OK,
        Html(task_detail::render_task_detail(
            &task,
            &comments,
            &attachments,
            Utc::now(),
        )),
    )
}

/// Tasks as JSON, filtered by the same query parameters as the page.
async fn api_tasks(
    State(state): State<DashboardServer>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<Task>>, RetrievalError> {
    let filters = FilterSpec::from(params);
    Ok(Json(state.store().fetch_tasks(&filters).await?))
}

async fn api_task_comments(
    State(state): State<DashboardServer>,
    Path(task_id): Path<String>,
) -> Result<Json<Vec<Comment>>, RetrievalError> {
    Ok(Json(state.store().fetch_task_comments(&task_id).await?))
}

async fn api_task_attachments(
    State(state): State<DashboardServer>,
    Path(task_id): Path<String>,
) -> Result<Json<Vec<Attachment>>, RetrievalError> {
    Ok(Json(state.store().fetch_task_attachments(&task_id).await?))
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the dashboard router.
pub fn build_router(state: DashboardServer) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Page routes
        .route("/", get(root))
        .route("/tasks/{task_id}", get(task_detail_page))
        // htmx fragment routes
        .route("/api/tasks/list", get(api_tasks_list))
        // JSON routes
        .route("/api/tasks", get(api_tasks))
        .route("/api/tasks/{task_id}/comments", get(api_task_comments))
        .route("/api/tasks/{task_id}/attachments", get(api_task_attachments))
        .route("/api/health", get(health))
        // Add middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the given address and port.
///
/// Returns a oneshot sender that can be used to signal shutdown,
/// and the actual address the server is bound to.
pub async fn start_server(
    store: Arc<dyn TaskStore>,
    bind: &str,
    port: u16,
) -> anyhow::Result<(oneshot::Sender<()>, SocketAddr)> {
    let state = DashboardServer::new(store);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind((bind, port)).await?;
    let bound_addr = listener.local_addr()?;

    info!("Dashboard server listening on http://{}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Dashboard server shutting down");
            })
            .await
        {
            tracing::error!("Dashboard server error: {}", e);
        }
    });

    Ok((shutdown_tx, bound_addr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("0.1.0"));
    }

    #[test]
    fn test_query_suffix() {
        assert_eq!(query_suffix(&FilterSpec::default()), "");
        let filters = FilterSpec {
            status: Some("pending".to_string()),
            ..Default::default()
        };
        assert_eq!(query_suffix(&filters), "?status=pending");
    }
}
