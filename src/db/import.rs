//! Seed the local store from a JSON snapshot.
//!
//! The snapshot uses the same row shapes the hosted store returns, so an
//! export of the remote tables can be loaded as-is.

use super::Database;
use super::query::format_timestamp;
use crate::types::{Attachment, Comment, Task};
use anyhow::{Context, Result};
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// A user row. Only the local store needs the full record; retrievals see
/// the joined creator summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "rowguid")]
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Rows to load, table by table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Snapshot {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))
    }
}

/// Row counts written by an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub users: usize,
    pub tasks: usize,
    pub comments: usize,
    pub attachments: usize,
}

impl Database {
    /// Write a snapshot in one transaction.
    ///
    /// With `replace`, existing rows in all tables are removed first;
    /// otherwise rows with the same id are overwritten.
    pub fn import_snapshot(&self, snapshot: &Snapshot, replace: bool) -> Result<ImportSummary> {
        let summary = self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            if replace {
                tx.execute_batch(
                    "DELETE FROM attachments;
                     DELETE FROM comments;
                     DELETE FROM tasks;
                     DELETE FROM users;",
                )?;
            }

            for user in &snapshot.users {
                tx.execute(
                    "INSERT INTO users (rowguid, username, email) VALUES (?1, ?2, ?3)
                     ON CONFLICT(rowguid) DO UPDATE SET username = excluded.username, email = excluded.email",
                    params![user.id, user.username, user.email],
                )?;
            }

            for task in &snapshot.tasks {
                tx.execute(
                    "INSERT INTO tasks
                     (rowguid, title, description, priority, status, due_date, created_by, partner_id, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                     ON CONFLICT(rowguid) DO UPDATE SET
                        title = excluded.title,
                        description = excluded.description,
                        priority = excluded.priority,
                        status = excluded.status,
                        due_date = excluded.due_date,
                        created_by = excluded.created_by,
                        partner_id = excluded.partner_id,
                        created_at = excluded.created_at,
                        updated_at = excluded.updated_at",
                    params![
                        task.id,
                        task.title,
                        task.description,
                        task.priority.as_str(),
                        task.status,
                        task.due_date.map(format_timestamp),
                        task.created_by,
                        task.group_id,
                        format_timestamp(task.created_at),
                        format_timestamp(task.updated_at),
                    ],
                )
                .with_context(|| format!("Failed to insert task {}", task.id))?;
            }

            for comment in &snapshot.comments {
                tx.execute(
                    "INSERT INTO comments (rowguid, task_id, user_id, content, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(rowguid) DO UPDATE SET
                        task_id = excluded.task_id,
                        user_id = excluded.user_id,
                        content = excluded.content,
                        created_at = excluded.created_at",
                    params![
                        comment.id,
                        comment.task_id,
                        comment.user_id,
                        comment.content,
                        format_timestamp(comment.created_at),
                    ],
                )
                .with_context(|| format!("Failed to insert comment {}", comment.id))?;
            }

            for attachment in &snapshot.attachments {
                tx.execute(
                    "INSERT INTO attachments (rowguid, task_id, filename, url, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(rowguid) DO UPDATE SET
                        task_id = excluded.task_id,
                        filename = excluded.filename,
                        url = excluded.url,
                        created_at = excluded.created_at",
                    params![
                        attachment.id,
                        attachment.task_id,
                        attachment.filename,
                        attachment.url,
                        format_timestamp(attachment.created_at),
                    ],
                )
                .with_context(|| format!("Failed to insert attachment {}", attachment.id))?;
            }

            tx.commit()?;

            Ok(ImportSummary {
                users: snapshot.users.len(),
                tasks: snapshot.tasks.len(),
                comments: snapshot.comments.len(),
                attachments: snapshot.attachments.len(),
            })
        })?;

        info!(
            users = summary.users,
            tasks = summary.tasks,
            comments = summary.comments,
            attachments = summary.attachments,
            replace,
            "Imported snapshot"
        );

        Ok(summary)
    }
}
