//! Task detail rendering: the task, its comments and its attachments.

use super::html_escape;
use super::task_list::{format_due_date, render_error};
use super::templates;
use crate::error::RetrievalResult;
use crate::types::{Attachment, Comment, Task};
use chrono::{DateTime, Utc};

fn render_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return r#"<p class="empty-state">No comments yet</p>"#.to_string();
    }
    comments
        .iter()
        .map(|c| {
            format!(
                r#"<div class="comment"><div class="comment-meta">{user} &middot; {at}</div><p>{content}</p></div>"#,
                user = html_escape(c.user_id.as_deref().unwrap_or("unknown")),
                at = format_due_date(c.created_at),
                content = html_escape(&c.content),
            )
        })
        .collect()
}

/// Only web URLs become links; anything else (`javascript:`, `data:`) is
/// shown as plain text.
fn is_web_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn render_attachment_name(attachment: &Attachment) -> String {
    let name = html_escape(&attachment.filename);
    if is_web_url(&attachment.url) {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener">{}</a>"#,
            html_escape(attachment.url.trim_start()),
            name
        )
    } else {
        name
    }
}

fn render_attachments(attachments: &[Attachment]) -> String {
    if attachments.is_empty() {
        return r#"<p class="empty-state">No attachments</p>"#.to_string();
    }
    let items: String = attachments
        .iter()
        .map(|a| {
            format!(
                r#"<li>{name} <span class="comment-meta">{at}</span></li>"#,
                name = render_attachment_name(a),
                at = format_due_date(a.created_at),
            )
        })
        .collect();
    format!("<ul>{}</ul>", items)
}

fn section<T>(result: &RetrievalResult<Vec<T>>, render: fn(&[T]) -> String) -> (String, String) {
    match result {
        Ok(items) => (items.len().to_string(), render(items)),
        Err(e) => ("?".to_string(), render_error(&e.message)),
    }
}

/// Full detail page. Comments and attachments are retrieved separately, so
/// either can fail without hiding the task.
pub fn render_task_detail(
    task: &Task,
    comments: &RetrievalResult<Vec<Comment>>,
    attachments: &RetrievalResult<Vec<Attachment>>,
    now: DateTime<Utc>,
) -> String {
    let due = match task.due_date {
        Some(due) if task.is_overdue(now) => format!(
            r#"<span class="task-due overdue">{} (overdue)</span>"#,
            format_due_date(due)
        ),
        Some(due) => format_due_date(due),
        None => "-".to_string(),
    };

    let creator = task
        .created_by_user
        .as_ref()
        .map(|u| format!("{} &lt;{}&gt;", html_escape(&u.username), html_escape(&u.email)))
        .unwrap_or_else(|| "-".to_string());

    let mut badges = format!(
        r#"<span class="badge badge-priority-{}">{}</span>"#,
        task.priority.as_str(),
        task.priority.label()
    );
    if !task.status.is_empty() {
        badges.push_str(&format!(
            r#" <span class="badge badge-status">{}</span>"#,
            html_escape(&task.status)
        ));
    }

    let description = if task.description.is_empty() {
        "No description".to_string()
    } else {
        html_escape(&task.description)
    };

    let (comment_count, comments_html) = section(comments, render_comments);
    let (attachment_count, attachments_html) = section(attachments, render_attachments);

    let title = html_escape(&task.title);
    let body = templates::fill(
        templates::TASK_DETAIL_TEMPLATE,
        &[
            ("priority_class", format!("priority-{}", task.priority.as_str()).as_str()),
            ("task_title", title.as_str()),
            ("badges", badges.as_str()),
            ("task_description", description.as_str()),
            ("due_date", due.as_str()),
            ("creator", creator.as_str()),
            ("created_at", format_due_date(task.created_at).as_str()),
            ("updated_at", format_due_date(task.updated_at).as_str()),
            ("task_id", html_escape(&task.id).as_str()),
            ("comment_count", comment_count.as_str()),
            ("comments", comments_html.as_str()),
            ("attachment_count", attachment_count.as_str()),
            ("attachments", attachments_html.as_str()),
        ],
    );

    templates::page(&title, &body)
}

/// Page for an id with no task.
pub fn render_not_found(task_id: &str) -> String {
    templates::page(
        "Task Not Found",
        &format!(
            r#"<div class="empty-state"><h3>Task not found</h3><p>No task with ID '{}'.</p><p><a href="/">Back to tasks</a></p></div>"#,
            html_escape(task_id)
        ),
    )
}

/// Page for a failed task retrieval.
pub fn render_load_error(message: &str) -> String {
    templates::page(
        "Error",
        &format!(r#"{}<p><a href="/">Back to tasks</a></p>"#, render_error(message)),
    )
}
