//! Filter form rendering.
//!
//! The form holds no state of its own: it renders whatever [`FilterSpec`] it
//! is given, and every edit is submitted as the complete form so the next
//! request carries the full updated spec.

use super::html_escape;
use crate::filters::{FilterEdit, FilterField, FilterSpec};
use crate::types::Priority;

/// Status values offered in the select.
pub const STATUS_OPTIONS: &[(&str, &str)] = &[
    ("pending", "Pending"),
    ("in_progress", "In progress"),
    ("completed", "Completed"),
];

/// Ordering directives offered in the select. The empty value means the
/// default order (newest first).
pub const ORDERING_OPTIONS: &[(&str, &str)] = &[
    ("", "Newest first"),
    ("created_at", "Oldest first"),
    ("due_date", "Due date (soonest)"),
    ("-due_date", "Due date (latest)"),
    ("priority", "Priority (high first)"),
    ("-priority", "Priority (low first)"),
    ("title", "Title (A-Z)"),
];

fn render_options(options: &[(&str, &str)], current: Option<&str>, any_label: Option<&str>) -> String {
    let current = current.unwrap_or("");
    let mut html = String::new();

    if let Some(label) = any_label {
        html.push_str(&format!(
            r#"<option value=""{}>{}</option>"#,
            if current.is_empty() { " selected" } else { "" },
            label
        ));
    }

    let mut matched = current.is_empty();
    for (value, label) in options {
        let selected = *value == current;
        matched |= selected;
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            value,
            if selected { " selected" } else { "" },
            label
        ));
    }

    // Keep a value that came in through the URL selectable
    if !matched {
        html.push_str(&format!(
            r#"<option value="{0}" selected>{0}</option>"#,
            html_escape(current)
        ));
    }

    html
}

fn priority_options() -> Vec<(&'static str, &'static str)> {
    Priority::ALL.iter().map(|p| (p.as_str(), p.label())).collect()
}

/// The filter form. Inputs are named after [`FilterField::name`].
pub fn render_filter_bar(filters: &FilterSpec) -> String {
    let value = |field: FilterField| html_escape(&filters.get(field).unwrap_or_default());
    let priority = filters.get(FilterField::Priority);

    format!(
        r##"<form id="filter-form" class="filter-bar"
              hx-get="/api/tasks/list"
              hx-target="#task-results"
              hx-trigger="change, input from:#search delay:300ms, submit"
              hx-sync="this:replace"
              hx-indicator="#task-results">
            <h2 class="filter-title">Filters</h2>
            <div class="filter-grid">
                <input id="search" type="search" name="{search}" value="{search_value}" placeholder="Search tasks..." autocomplete="off">
                <select name="{priority_name}">{priority_options}</select>
                <select name="{status}">{status_options}</select>
                <select name="{ordering}">{ordering_options}</select>
                <label>Due from <input type="date" name="{gte}" value="{gte_value}"></label>
                <label>Due until <input type="date" name="{lte}" value="{lte_value}"></label>
                <button type="button" class="btn-refresh"
                        hx-get="/api/tasks/list" hx-include="#filter-form" hx-target="#task-results">Refresh</button>
            </div>
            {chips}
        </form>"##,
        search = FilterField::Search.name(),
        search_value = value(FilterField::Search),
        priority_name = FilterField::Priority.name(),
        priority_options = render_options(&priority_options(), priority.as_deref(), Some("All priorities")),
        status = FilterField::Status.name(),
        status_options = render_options(STATUS_OPTIONS, filters.status.as_deref(), Some("All statuses")),
        ordering = FilterField::Ordering.name(),
        ordering_options = render_options(ORDERING_OPTIONS, filters.ordering.as_deref(), None),
        gte = FilterField::DueDateGte.name(),
        gte_value = value(FilterField::DueDateGte),
        lte = FilterField::DueDateLte.name(),
        lte_value = value(FilterField::DueDateLte),
        chips = render_active_filters(filters),
    )
}

fn chips_html(filters: &FilterSpec) -> String {
    let active = filters.active_fields();
    if active.is_empty() {
        return String::new();
    }

    let mut html = String::new();
    for (field, value) in active {
        let remaining = filters.apply(FilterEdit::clear(field)).to_query_string();
        let href = if remaining.is_empty() {
            "/".to_string()
        } else {
            format!("/?{}", remaining)
        };
        html.push_str(&format!(
            r#"<a class="chip" href="{href}" title="Remove filter">{label}: {value} &times;</a>"#,
            href = html_escape(&href),
            label = field.label(),
            value = html_escape(&value),
        ));
    }
    html.push_str(r#"<a class="chip chip-clear" href="/">Clear all</a>"#);
    html
}

/// Removable chips for the set fields. Each links to the page with that
/// one field cleared and the rest kept.
pub fn render_active_filters(filters: &FilterSpec) -> String {
    format!(
        r#"<div id="active-filters" class="active-filters">{}</div>"#,
        chips_html(filters)
    )
}

/// The chips as an htmx out-of-band swap, sent along with each list
/// fragment so they follow form edits.
pub fn render_active_filters_oob(filters: &FilterSpec) -> String {
    format!(
        r#"<div id="active-filters" class="active-filters" hx-swap-oob="true">{}</div>"#,
        chips_html(filters)
    )
}
