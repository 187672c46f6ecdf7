//! Store-neutral query model.
//!
//! A [`TableQuery`] names a table, the predicates to AND together, related
//! rows to embed, and the sort order. The REST client renders it as
//! PostgREST query parameters; the local SQLite store compiles it to SQL.

use crate::filters::{FilterSpec, OrderDirective};

pub const TASKS: &str = "tasks";
pub const COMMENTS: &str = "comments";
pub const ATTACHMENTS: &str = "attachments";
pub const USERS: &str = "users";

/// Primary key column shared by every table.
pub const ID_COLUMN: &str = "rowguid";

/// A single filter predicate over a named column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Eq { column: String, value: String },
    Gte { column: String, value: String },
    Lte { column: String, value: String },
    /// Case-insensitive substring match against any of the columns.
    ContainsAny { columns: Vec<String>, term: String },
}

/// A to-one relationship pulled in alongside each row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// Key the related object appears under in each row.
    pub alias: &'static str,
    pub table: &'static str,
    /// Foreign key constraint name, used by the REST store to disambiguate.
    pub constraint: &'static str,
    /// Column on the base table referencing the related row's id.
    pub local_column: &'static str,
    pub columns: &'static [&'static str],
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub descending: bool,
}

/// A read query against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    pub table: &'static str,
    pub embeds: Vec<Embed>,
    pub predicates: Vec<Predicate>,
    pub order: Vec<OrderBy>,
}

/// Creator username/email joined onto each task.
pub const CREATOR_EMBED: Embed = Embed {
    alias: "created_by_user",
    table: USERS,
    constraint: "tasks_created_by_fkey",
    local_column: "created_by",
    columns: &["username", "email"],
};

impl TableQuery {
    pub fn from(table: &'static str) -> Self {
        Self {
            table,
            embeds: Vec::new(),
            predicates: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Eq {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn gte(mut self, column: &str, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Gte {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn lte(mut self, column: &str, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Lte {
            column: column.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn contains_any(mut self, columns: &[&str], term: impl Into<String>) -> Self {
        self.predicates.push(Predicate::ContainsAny {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            term: term.into(),
        });
        self
    }

    pub fn order(mut self, column: &str, descending: bool) -> Self {
        self.order.push(OrderBy {
            column: column.to_string(),
            descending,
        });
        self
    }

    /// Render as PostgREST query parameters, in a stable order.
    pub fn to_postgrest_params(&self) -> Vec<(String, String)> {
        let mut select = String::from("*");
        for embed in &self.embeds {
            select.push_str(&format!(
                ",{}:{}!{}({})",
                embed.alias,
                embed.table,
                embed.constraint,
                embed.columns.join(",")
            ));
        }

        let mut params = vec![("select".to_string(), select)];

        for predicate in &self.predicates {
            match predicate {
                Predicate::Eq { column, value } => {
                    params.push((column.clone(), format!("eq.{}", value)));
                }
                Predicate::Gte { column, value } => {
                    params.push((column.clone(), format!("gte.{}", value)));
                }
                Predicate::Lte { column, value } => {
                    params.push((column.clone(), format!("lte.{}", value)));
                }
                Predicate::ContainsAny { columns, term } => {
                    let pattern = quote_postgrest(&format!("*{}*", term));
                    let alternatives: Vec<String> = columns
                        .iter()
                        .map(|c| format!("{}.ilike.{}", c, pattern))
                        .collect();
                    params.push(("or".to_string(), format!("({})", alternatives.join(","))));
                }
            }
        }

        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.descending { "desc" } else { "asc" }))
                .collect();
            params.push(("order".to_string(), order.join(",")));
        }

        params
    }
}

/// Double-quote a PostgREST filter value so commas and parentheses in user
/// input cannot break the `or=(...)` list.
fn quote_postgrest(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Build the task query for a filter specification.
///
/// Sorts by the requested field (default `created_at` descending), then by
/// id in the same direction so reversed directives give reversed results.
pub fn tasks_query(filters: &FilterSpec) -> TableQuery {
    let mut query = TableQuery::from(TASKS).embed(CREATOR_EMBED);

    if let Some(ref priority) = filters.priority {
        query = query.eq("priority", priority.as_str());
    }
    if let Some(ref status) = filters.status {
        query = query.eq("status", status.as_str());
    }
    if let Some(ref search) = filters.search {
        query = query.contains_any(&["title", "description"], search.as_str());
    }
    if let Some(ref from) = filters.due_date_gte {
        query = query.gte("due_date", from.as_str());
    }
    if let Some(ref until) = filters.due_date_lte {
        query = query.lte("due_date", until.as_str());
    }

    let OrderDirective { field, descending } = filters.order();
    query = query.order(&field, descending);
    if field != ID_COLUMN {
        query = query.order(ID_COLUMN, descending);
    }
    query
}

/// Single task by id, with its creator.
pub fn task_by_id_query(task_id: &str) -> TableQuery {
    TableQuery::from(TASKS)
        .embed(CREATOR_EMBED)
        .eq(ID_COLUMN, task_id)
}

/// Rows of `table` belonging to a task, oldest first.
pub fn task_children_query(table: &'static str, task_id: &str) -> TableQuery {
    TableQuery::from(table)
        .eq("task_id", task_id)
        .order("created_at", false)
        .order(ID_COLUMN, false)
}
