//! Task list rendering.
//!
//! Pure functions from tasks (and the current time, for the overdue marker)
//! to HTML fragments.

use super::html_escape;
use crate::page::PageState;
use crate::types::{Priority, Task};
use chrono::{DateTime, Utc};

/// Heading of the empty-state placeholder.
pub const EMPTY_TITLE: &str = "No tasks found";

const EMPTY_DETAIL: &str = "There are no tasks matching the selected filters.";

/// Longest description shown in a summary, in characters.
const EXCERPT_CHARS: usize = 180;

fn priority_class(priority: Priority) -> &'static str {
    match priority {
        Priority::High => "priority-high",
        Priority::Medium => "priority-medium",
        Priority::Low => "priority-low",
    }
}

/// Date and time as dd/mm/yyyy hh:mm (UTC).
pub fn format_due_date(due: DateTime<Utc>) -> String {
    due.format("%d/%m/%Y %H:%M").to_string()
}

fn excerpt(text: &str) -> String {
    if text.chars().count() > EXCERPT_CHARS {
        let cut: String = text.chars().take(EXCERPT_CHARS - 3).collect();
        format!("{}...", cut.trim_end())
    } else {
        text.to_string()
    }
}

/// One task summary card.
pub fn render_task_item(task: &Task, now: DateTime<Utc>) -> String {
    let status_html = if task.status.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span class="badge badge-status">{}</span>"#,
            html_escape(&task.status)
        )
    };

    let description_html = if task.description.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p class="task-description">{}</p>"#,
            html_escape(&excerpt(&task.description))
        )
    };

    let due_html = match task.due_date {
        Some(due) => {
            let overdue = task.is_overdue(now);
            format!(
                r#"<span class="task-due{overdue_class}"><span class="icon">&#128197;</span>{date}{marker}</span>"#,
                overdue_class = if overdue { " overdue" } else { "" },
                date = format_due_date(due),
                marker = if overdue {
                    r#"<span class="overdue-indicator" title="Overdue">&#9888;</span>"#
                } else {
                    ""
                },
            )
        }
        None => String::new(),
    };

    let creator_html = task
        .created_by_user
        .as_ref()
        .map(|user| {
            format!(
                r#"<span class="task-creator" title="{email}"><span class="icon">&#128100;</span>{name}</span>"#,
                email = html_escape(&user.email),
                name = html_escape(&user.username),
            )
        })
        .unwrap_or_default();

    format!(
        r#"<article class="task-card {priority_class}" data-task-id="{id}">
            <div class="task-header">
                <h3 class="task-title"><a href="/tasks/{id_path}">{title}</a></h3>
                <div class="task-badges">
                    <span class="badge badge-{priority_class}">{priority_label}</span>
                    {status_html}
                </div>
            </div>
            {description_html}
            <div class="task-meta">{due_html}{creator_html}</div>
        </article>"#,
        priority_class = priority_class(task.priority),
        id = html_escape(&task.id),
        id_path = urlencoding::encode(&task.id),
        title = html_escape(&task.title),
        priority_label = task.priority.label(),
        status_html = status_html,
        description_html = description_html,
        due_html = due_html,
        creator_html = creator_html,
    )
}

/// One summary per task in received order, or the empty placeholder.
pub fn render_task_list(tasks: &[Task], now: DateTime<Utc>) -> String {
    if tasks.is_empty() {
        return format!(
            r#"<div class="empty-state">
                <div class="empty-icon">&#128203;</div>
                <h3>{}</h3>
                <p>{}</p>
            </div>"#,
            EMPTY_TITLE, EMPTY_DETAIL
        );
    }

    let mut html = String::from(r#"<div class="task-list">"#);
    for task in tasks {
        html.push_str(&render_task_item(task, now));
    }
    html.push_str("</div>");
    html
}

/// "N tasks found" footer.
pub fn render_count(count: usize) -> String {
    format!(
        r#"<div class="task-count">{} {}</div>"#,
        count,
        if count == 1 { "task found" } else { "tasks found" }
    )
}

pub fn render_loading() -> String {
    r#"<div class="loading"><span class="spinner"></span><span>Loading tasks...</span></div>"#
        .to_string()
}

pub fn render_error(message: &str) -> String {
    format!(
        r#"<div class="error-banner" role="alert">
            <p class="error-title">Failed to load tasks</p>
            <p class="error-message">{}</p>
        </div>"#,
        html_escape(message)
    )
}

/// Results area for a page state: spinner, error banner over an empty
/// list, or the list with its count.
pub fn render_results(state: &PageState, now: DateTime<Utc>) -> String {
    match state {
        PageState::Loading => render_loading(),
        PageState::Error(message) => {
            format!("{}{}", render_error(message), render_task_list(&[], now))
        }
        PageState::Ready(tasks) if tasks.is_empty() => render_task_list(tasks, now),
        PageState::Ready(tasks) => {
            format!("{}{}", render_task_list(tasks, now), render_count(tasks.len()))
        }
    }
}
