//! Compile a [`TableQuery`] to SQLite and decode the rows as JSON objects.

use super::Database;
use crate::store::query::{ATTACHMENTS, COMMENTS, ID_COLUMN, Predicate, TASKS, TableQuery, USERS};
use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};

const TASK_COLUMNS: &[&str] = &[
    "rowguid",
    "title",
    "description",
    "priority",
    "status",
    "due_date",
    "created_by",
    "partner_id",
    "created_at",
    "updated_at",
];
const COMMENT_COLUMNS: &[&str] = &["rowguid", "task_id", "user_id", "content", "created_at"];
const ATTACHMENT_COLUMNS: &[&str] = &["rowguid", "task_id", "filename", "url", "created_at"];
const USER_COLUMNS: &[&str] = &["rowguid", "username", "email"];

/// Columns holding RFC 3339 timestamps. Comparison values on these are
/// normalized to the stored format so text comparison matches time order.
const TIMESTAMP_COLUMNS: &[&str] = &["due_date", "created_at", "updated_at"];

fn table_columns(table: &str) -> Option<&'static [&'static str]> {
    match table {
        TASKS => Some(TASK_COLUMNS),
        COMMENTS => Some(COMMENT_COLUMNS),
        ATTACHMENTS => Some(ATTACHMENT_COLUMNS),
        USERS => Some(USER_COLUMNS),
        _ => None,
    }
}

/// Qualified column reference, or the store's "does not exist" error.
fn column(table: &str, name: &str) -> Result<String> {
    let columns = table_columns(table).ok_or_else(|| anyhow!("relation {} does not exist", table))?;
    if columns.contains(&name) {
        Ok(format!("{}.{}", table, name))
    } else {
        Err(anyhow!("column {}.{} does not exist", table, name))
    }
}

/// Canonical stored form of a timestamp.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Zoneless date-time layouts accepted for comparison values, read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Bring a comparison value into the stored timestamp format. Dates mean
/// midnight UTC and zoneless date-times are UTC; values that parse as none
/// of these are compared as given.
fn normalize_timestamp(value: &str) -> String {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return format_timestamp(ts.with_timezone(&Utc));
    }
    // RFC 3339 with a space separator, as PostgreSQL prints timestamps
    if let Ok(ts) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return format_timestamp(ts.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return format_timestamp(Utc.from_utc_datetime(&naive));
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return format_timestamp(Utc.from_utc_datetime(&midnight));
    }
    value.to_string()
}

fn comparison_value(column: &str, value: &str) -> String {
    if TIMESTAMP_COLUMNS.contains(&column) {
        normalize_timestamp(value)
    } else {
        value.to_string()
    }
}

/// Substring pattern with LIKE wildcards in the term escaped. The term is
/// lowercased to match the `casefold`ed column.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Sort expression; priority sorts by its enumeration order.
fn order_expr(table: &str, name: &str) -> Result<String> {
    let col = column(table, name)?;
    if table == TASKS && name == "priority" {
        Ok(format!(
            "CASE {} WHEN 'high' THEN 0 WHEN 'medium' THEN 1 WHEN 'low' THEN 2 END",
            col
        ))
    } else {
        Ok(col)
    }
}

/// Where a selected column lands in the decoded row.
#[derive(Debug, Clone)]
struct OutputColumn {
    embed: Option<&'static str>,
    name: &'static str,
}

/// SQL text, positional parameters, and the output layout.
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<String>,
    outputs: Vec<OutputColumn>,
}

/// Compile a query to parameterized SQL.
pub fn compile(query: &TableQuery) -> Result<CompiledQuery> {
    let table = query.table;
    let base_columns =
        table_columns(table).ok_or_else(|| anyhow!("relation {} does not exist", table))?;

    let mut select = Vec::new();
    let mut outputs = Vec::new();
    for &name in base_columns {
        select.push(format!("{}.{}", table, name));
        outputs.push(OutputColumn { embed: None, name });
    }

    let mut joins = String::new();
    for embed in &query.embeds {
        column(table, embed.local_column)?;
        let embed_columns = table_columns(embed.table)
            .ok_or_else(|| anyhow!("relation {} does not exist", embed.table))?;
        for &name in embed.columns {
            if !embed_columns.contains(&name) {
                return Err(anyhow!("column {}.{} does not exist", embed.table, name));
            }
            select.push(format!("{}.{}", embed.alias, name));
            outputs.push(OutputColumn {
                embed: Some(embed.alias),
                name,
            });
        }
        joins.push_str(&format!(
            " LEFT JOIN {} AS {} ON {}.{} = {}.{}",
            embed.table, embed.alias, embed.alias, ID_COLUMN, table, embed.local_column
        ));
    }

    let mut params: Vec<String> = Vec::new();
    let mut conditions = Vec::new();
    for predicate in &query.predicates {
        match predicate {
            Predicate::Eq { column: name, value } => {
                params.push(comparison_value(name, value));
                conditions.push(format!("{} = ?{}", column(table, name)?, params.len()));
            }
            Predicate::Gte { column: name, value } => {
                params.push(comparison_value(name, value));
                conditions.push(format!("{} >= ?{}", column(table, name)?, params.len()));
            }
            Predicate::Lte { column: name, value } => {
                params.push(comparison_value(name, value));
                conditions.push(format!("{} <= ?{}", column(table, name)?, params.len()));
            }
            Predicate::ContainsAny { columns, term } => {
                params.push(like_pattern(term));
                let idx = params.len();
                let alternatives = columns
                    .iter()
                    .map(|name| {
                        Ok(format!(
                            "casefold({}) LIKE ?{} ESCAPE '\\'",
                            column(table, name)?,
                            idx
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?;
                conditions.push(format!("({})", alternatives.join(" OR ")));
            }
        }
    }

    let mut sql = format!("SELECT {} FROM {}{}", select.join(", "), table, joins);
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    if !query.order.is_empty() {
        let keys = query
            .order
            .iter()
            .map(|o| {
                let expr = order_expr(table, &o.column)?;
                // Nulls last ascending, first descending, as the hosted store does
                Ok(if o.descending {
                    format!("{} DESC NULLS FIRST", expr)
                } else {
                    format!("{} ASC NULLS LAST", expr)
                })
            })
            .collect::<Result<Vec<_>>>()?;
        sql.push_str(" ORDER BY ");
        sql.push_str(&keys.join(", "));
    }

    Ok(CompiledQuery {
        sql,
        params,
        outputs,
    })
}

impl Database {
    /// Run a query and return each row as a JSON object keyed by column
    /// name. Embedded rows become nested objects, or null when unmatched.
    pub fn run_query(&self, query: &TableQuery) -> Result<Vec<Value>> {
        let compiled = compile(query)?;

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&compiled.sql)?;
            let params: Vec<&dyn rusqlite::ToSql> =
                compiled.params.iter().map(|p| p as &dyn rusqlite::ToSql).collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    let mut object = Map::new();
                    let mut embeds: Vec<(&'static str, Map<String, Value>, bool)> = Vec::new();

                    for (idx, output) in compiled.outputs.iter().enumerate() {
                        let value: Option<String> = row.get(idx)?;
                        let matched = value.is_some();
                        let value = value.map(Value::String).unwrap_or(Value::Null);

                        match output.embed {
                            None => {
                                object.insert(output.name.to_string(), value);
                            }
                            Some(alias) => {
                                if let Some(entry) = embeds.iter_mut().find(|(a, _, _)| *a == alias) {
                                    entry.1.insert(output.name.to_string(), value);
                                    entry.2 |= matched;
                                } else {
                                    let mut fields = Map::new();
                                    fields.insert(output.name.to_string(), value);
                                    embeds.push((alias, fields, matched));
                                }
                            }
                        }
                    }

                    for (alias, fields, matched) in embeds {
                        let value = if matched { Value::Object(fields) } else { Value::Null };
                        object.insert(alias.to_string(), value);
                    }

                    Ok(Value::Object(object))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterSpec;
    use crate::store::query::tasks_query;

    #[test]
    fn compiles_default_task_query_with_creator_join() {
        let compiled = compile(&tasks_query(&FilterSpec::default())).unwrap();
        assert!(compiled.sql.contains(
            "LEFT JOIN users AS created_by_user ON created_by_user.rowguid = tasks.created_by"
        ));
        assert!(compiled.sql.ends_with(
            "ORDER BY tasks.created_at DESC NULLS FIRST, tasks.rowguid DESC NULLS FIRST"
        ));
        assert!(compiled.params.is_empty());
    }

    #[test]
    fn compiles_filters_to_numbered_parameters() {
        let filters = FilterSpec {
            priority: Some("low".to_string()),
            search: Some("50%_off".to_string()),
            due_date_gte: Some("2024-02-01".to_string()),
            ..Default::default()
        };
        let compiled = compile(&tasks_query(&filters)).unwrap();

        assert!(compiled.sql.contains("tasks.priority = ?1"));
        assert!(compiled.sql.contains(
            "(casefold(tasks.title) LIKE ?2 ESCAPE '\\' OR casefold(tasks.description) LIKE ?2 ESCAPE '\\')"
        ));
        assert!(compiled.sql.contains("tasks.due_date >= ?3"));
        assert_eq!(
            compiled.params,
            vec![
                "low".to_string(),
                "%50\\%\\_off%".to_string(),
                "2024-02-01T00:00:00.000Z".to_string(),
            ]
        );
    }

    #[test]
    fn priority_orders_by_enumeration() {
        let filters = FilterSpec {
            ordering: Some("-priority".to_string()),
            ..Default::default()
        };
        let compiled = compile(&tasks_query(&filters)).unwrap();
        assert!(compiled.sql.contains(
            "ORDER BY CASE tasks.priority WHEN 'high' THEN 0 WHEN 'medium' THEN 1 WHEN 'low' THEN 2 END DESC NULLS FIRST"
        ));
    }

    #[test]
    fn unknown_order_column_is_rejected() {
        let filters = FilterSpec {
            ordering: Some("owner".to_string()),
            ..Default::default()
        };
        let err = compile(&tasks_query(&filters)).unwrap_err();
        assert_eq!(err.to_string(), "column tasks.owner does not exist");
    }

    #[test]
    fn timestamps_normalize_to_stored_format() {
        assert_eq!(
            normalize_timestamp("2024-03-05T10:15:00+02:00"),
            "2024-03-05T08:15:00.000Z"
        );
        assert_eq!(normalize_timestamp("2024-03-05"), "2024-03-05T00:00:00.000Z");
        assert_eq!(
            normalize_timestamp("2024-07-15 10:00:00"),
            "2024-07-15T10:00:00.000Z"
        );
        assert_eq!(
            normalize_timestamp("2024-07-15T10:00"),
            "2024-07-15T10:00:00.000Z"
        );
        assert_eq!(
            normalize_timestamp("2024-07-15 12:00:00+02:00"),
            "2024-07-15T10:00:00.000Z"
        );
        assert_eq!(normalize_timestamp("next week"), "next week");
    }
}
