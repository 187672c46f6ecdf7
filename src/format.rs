//! Output formatting for the terminal listing.

use crate::dashboard::task_list::format_due_date;
use crate::filters::FilterSpec;
use crate::types::Task;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

/// One task as a markdown bullet.
pub fn format_task_short(task: &Task, now: DateTime<Utc>) -> String {
    let mut line = format!("- **{}** [{}]", task.title, task.priority.as_str());
    if !task.status.is_empty() {
        line.push_str(&format!(" ({})", task.status));
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {}", format_due_date(due)));
        if task.is_overdue(now) {
            line.push_str(" OVERDUE");
        }
    }
    if let Some(ref user) = task.created_by_user {
        line.push_str(&format!(" by {}", user.username));
    }
    line.push_str(&format!(" `{}`\n", task.id));
    line
}

/// A task list as markdown, with the active filters as a subtitle.
pub fn format_tasks_markdown(tasks: &[Task], filters: &FilterSpec, now: DateTime<Utc>) -> String {
    let mut md = format!("# Tasks ({})\n\n", tasks.len());

    let active = filters.active_fields();
    if !active.is_empty() {
        let parts: Vec<String> = active
            .iter()
            .map(|(field, value)| format!("{}: {}", field.label(), value))
            .collect();
        md.push_str(&format!("_{}_\n\n", parts.join(", ")));
    }

    if tasks.is_empty() {
        md.push_str("No tasks found\n");
        return md;
    }

    for task in tasks {
        md.push_str(&format_task_short(task, now));
    }
    md
}

/// A task list in the requested format.
pub fn format_tasks(
    tasks: &[Task],
    filters: &FilterSpec,
    format: OutputFormat,
    now: DateTime<Utc>,
) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(tasks)?),
        OutputFormat::Markdown => Ok(format_tasks_markdown(tasks, filters, now)),
    }
}
