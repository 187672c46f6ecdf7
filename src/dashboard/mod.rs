//! Web dashboard HTTP server module.
//!
//! Serves the task page and the htmx fragments it refreshes from, plus a
//! small JSON API over the same retrievals.

pub mod filter_bar;
mod server;
pub mod task_detail;
pub mod task_list;
pub mod templates;

pub use server::{DashboardServer, build_router, start_server};

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
