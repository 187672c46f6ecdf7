//! HTTP client for a PostgREST-compatible hosted store.

use super::TaskStore;
use super::query::TableQuery;
use crate::error::{RetrievalError, RetrievalResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Time allowed to establish a connection to the store.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error body returned by the store on failure.
#[derive(Debug, Deserialize)]
struct StoreErrorBody {
    message: String,
}

/// Remote store client. Constructed once at startup and shared.
pub struct RestStore {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl RestStore {
    /// Create a client for the store at `base_url`, authenticating with the
    /// public access key.
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::builder()
                .connect_timeout(CONNECT_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

/// Extract the store's message from a failed response.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(err) = serde_json::from_str::<StoreErrorBody>(body) {
        return err.message;
    }
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        body.to_string()
    }
}

#[async_trait]
impl TaskStore for RestStore {
    async fn select(&self, query: &TableQuery) -> RetrievalResult<Vec<Value>> {
        let table = query.table;
        let params = query.to_postgrest_params();
        debug!(table, params = ?params, "Querying remote store");

        let response = self
            .client
            .get(self.table_url(table))
            .query(&params)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| RetrievalError::from_display(table, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            warn!(table, status = status.as_u16(), message = %message, "Remote store rejected query");
            return Err(RetrievalError::new(table, message));
        }

        response
            .json::<Vec<Value>>()
            .await
            .map_err(|e| RetrievalError::from_display(table, e))
    }
}
