//! List subcommand for task-board CLI
//!
//! Runs one task retrieval with filters given as flags and prints the
//! result to stdout.

use crate::filters::{FilterParams, FilterSpec};
use clap::Args;

/// Arguments for the list subcommand
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Only tasks with this priority (high, medium, low)
    #[arg(long)]
    pub priority: Option<String>,

    /// Only tasks with this status
    #[arg(long)]
    pub status: Option<String>,

    /// Case-insensitive text to find in title or description
    #[arg(short, long)]
    pub search: Option<String>,

    /// Earliest due date (inclusive), e.g. 2024-01-31
    #[arg(long, value_name = "DATE")]
    pub due_from: Option<String>,

    /// Latest due date (inclusive)
    #[arg(long, value_name = "DATE")]
    pub due_until: Option<String>,

    /// Sort field, prefixed with '-' for descending (default: -created_at)
    #[arg(short, long, allow_hyphen_values = true)]
    pub ordering: Option<String>,

    /// Output format: markdown or json
    #[arg(short, long, default_value = "markdown")]
    pub format: String,
}

impl ListArgs {
    /// The filter spec these flags describe. Blank values are treated as
    /// unset, as in the web form.
    pub fn filters(&self) -> FilterSpec {
        FilterSpec::from(FilterParams {
            priority: self.priority.clone(),
            status: self.status.clone(),
            search: self.search.clone(),
            due_date_gte: self.due_from.clone(),
            due_date_lte: self.due_until.clone(),
            ordering: self.ordering.clone(),
        })
    }
}
