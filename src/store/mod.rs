//! Store access for task retrieval.
//!
//! [`TaskStore`] is the seam between the page and the data service. A store
//! only has to execute a [`TableQuery`] and return rows as JSON objects; the
//! typed retrievals are provided on top of that.

pub mod query;
pub mod rest;

use crate::config::{StoreBackend, StoreConfig};
use crate::db::Database;
use crate::error::{RetrievalError, RetrievalResult};
use crate::filters::FilterSpec;
use crate::types::{Attachment, Comment, Task};
use async_trait::async_trait;
use query::{ATTACHMENTS, COMMENTS, TASKS, TableQuery};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub use rest::RestStore;

/// A read-only handle on the task store.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Execute a query and return matching rows, embeds included.
    async fn select(&self, query: &TableQuery) -> RetrievalResult<Vec<Value>>;

    /// Tasks matching every set filter field, in the requested order, each
    /// with its creator summary when one resolves.
    async fn fetch_tasks(&self, filters: &FilterSpec) -> RetrievalResult<Vec<Task>> {
        let rows = self.select(&query::tasks_query(filters)).await?;
        let tasks = decode_rows(TASKS, rows)?;
        debug!(table = TASKS, rows = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    /// A single task, or `None` if no row has that id.
    async fn fetch_task(&self, task_id: &str) -> RetrievalResult<Option<Task>> {
        let rows = self.select(&query::task_by_id_query(task_id)).await?;
        Ok(decode_rows(TASKS, rows)?.into_iter().next())
    }

    /// Comments on a task, oldest first.
    async fn fetch_task_comments(&self, task_id: &str) -> RetrievalResult<Vec<Comment>> {
        let rows = self
            .select(&query::task_children_query(COMMENTS, task_id))
            .await?;
        decode_rows(COMMENTS, rows)
    }

    /// Attachments of a task, oldest first.
    async fn fetch_task_attachments(&self, task_id: &str) -> RetrievalResult<Vec<Attachment>> {
        let rows = self
            .select(&query::task_children_query(ATTACHMENTS, task_id))
            .await?;
        decode_rows(ATTACHMENTS, rows)
    }
}

/// Decode JSON rows into records. A row that does not fit the record shape
/// fails the whole retrieval.
pub fn decode_rows<T: DeserializeOwned>(
    table: &'static str,
    rows: Vec<Value>,
) -> RetrievalResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| RetrievalError::from_display(table, e)))
        .collect()
}

/// Construct the store client selected by configuration.
///
/// The URL and key are handed to the client as-is; a missing or invalid
/// endpoint surfaces as a retrieval error on first use.
pub fn open(config: &StoreConfig) -> anyhow::Result<Arc<dyn TaskStore>> {
    match config.backend {
        StoreBackend::Rest => {
            let store = RestStore::new(
                config.url.as_deref().unwrap_or_default(),
                config.key.as_deref().unwrap_or_default(),
            );
            info!(url = %store.base_url(), "Using remote task store");
            Ok(Arc::new(store))
        }
        StoreBackend::Sqlite => {
            config.ensure_db_dir()?;
            info!(path = %config.db_path.display(), "Using local task store");
            Ok(Arc::new(Database::open(&config.db_path)?))
        }
    }
}
