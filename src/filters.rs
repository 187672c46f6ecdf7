//! Filter specification for the task list.
//!
//! A [`FilterSpec`] is the transient value the filter form edits and the
//! task retrieval consumes. It is never persisted; the dashboard carries it
//! in the query string.

use serde::{Deserialize, Serialize};

/// Column and direction used when no ordering directive is given.
pub const DEFAULT_ORDER_FIELD: &str = "created_at";

/// Optional predicates and ordering for a task retrieval.
///
/// Every field is optional; present fields are combined with AND. Values
/// are passed to the store uninterpreted, so a priority outside the known
/// set matches nothing rather than being ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date_gte: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date_lte: Option<String>,
    /// Field name, optionally prefixed with `-` for descending order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

/// Raw form/query-string values. Empty strings mean "not set".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    pub priority: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub due_date_gte: Option<String>,
    pub due_date_lte: Option<String>,
    pub ordering: Option<String>,
}

impl From<FilterParams> for FilterSpec {
    fn from(params: FilterParams) -> Self {
        Self {
            priority: non_empty(params.priority),
            status: non_empty(params.status),
            search: non_empty(params.search),
            due_date_gte: non_empty(params.due_date_gte),
            due_date_lte: non_empty(params.due_date_lte),
            ordering: non_empty(params.ordering),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// One field of a [`FilterSpec`], named as it appears in forms and URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Priority,
    Status,
    Search,
    DueDateGte,
    DueDateLte,
    Ordering,
}

impl FilterField {
    pub const ALL: [FilterField; 6] = [
        FilterField::Search,
        FilterField::Priority,
        FilterField::Status,
        FilterField::DueDateGte,
        FilterField::DueDateLte,
        FilterField::Ordering,
    ];

    /// Form/query parameter name.
    pub fn name(&self) -> &'static str {
        match self {
            FilterField::Priority => "priority",
            FilterField::Status => "status",
            FilterField::Search => "search",
            FilterField::DueDateGte => "due_date_gte",
            FilterField::DueDateLte => "due_date_lte",
            FilterField::Ordering => "ordering",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterField::Priority => "Priority",
            FilterField::Status => "Status",
            FilterField::Search => "Search",
            FilterField::DueDateGte => "Due from",
            FilterField::DueDateLte => "Due until",
            FilterField::Ordering => "Sort",
        }
    }
}

/// A single field edit coming from the filter form.
///
/// `None` (or an empty string) clears the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEdit {
    pub field: FilterField,
    pub value: Option<String>,
}

impl FilterEdit {
    pub fn set(field: FilterField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: Some(value.into()),
        }
    }

    pub fn clear(field: FilterField) -> Self {
        Self { field, value: None }
    }
}

/// Sort column and direction parsed from an ordering directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDirective {
    pub field: String,
    pub descending: bool,
}

impl OrderDirective {
    /// Parse `"field"` (ascending) or `"-field"` (descending).
    pub fn parse(directive: &str) -> Self {
        match directive.strip_prefix('-') {
            Some(field) => Self {
                field: field.to_string(),
                descending: true,
            },
            None => Self {
                field: directive.to_string(),
                descending: false,
            },
        }
    }

    /// Newest first.
    pub fn default_order() -> Self {
        Self {
            field: DEFAULT_ORDER_FIELD.to_string(),
            descending: true,
        }
    }
}

impl FilterSpec {
    /// Ordering to apply, falling back to creation time descending.
    pub fn order(&self) -> OrderDirective {
        self.ordering
            .as_deref()
            .map(OrderDirective::parse)
            .unwrap_or_else(OrderDirective::default_order)
    }

    /// Current value of a field as a form string.
    pub fn get(&self, field: FilterField) -> Option<String> {
        match field {
            FilterField::Priority => self.priority.clone(),
            FilterField::Status => self.status.clone(),
            FilterField::Search => self.search.clone(),
            FilterField::DueDateGte => self.due_date_gte.clone(),
            FilterField::DueDateLte => self.due_date_lte.clone(),
            FilterField::Ordering => self.ordering.clone(),
        }
    }

    /// Apply one field edit and return the complete updated spec.
    ///
    /// The edited field is replaced (or cleared when the value is empty);
    /// every other field is carried over unchanged.
    pub fn apply(&self, edit: FilterEdit) -> FilterSpec {
        let mut next = self.clone();
        let value = non_empty(edit.value);
        match edit.field {
            FilterField::Priority => next.priority = value,
            FilterField::Status => next.status = value,
            FilterField::Search => next.search = value,
            FilterField::DueDateGte => next.due_date_gte = value,
            FilterField::DueDateLte => next.due_date_lte = value,
            FilterField::Ordering => next.ordering = value,
        }
        next
    }

    /// Fields that are currently set, in display order.
    pub fn active_fields(&self) -> Vec<(FilterField, String)> {
        FilterField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| (field, value)))
            .collect()
    }

    /// Encode the set fields as a URL query string (without leading `?`).
    pub fn to_query_string(&self) -> String {
        self.active_fields()
            .into_iter()
            .map(|(field, value)| format!("{}={}", field.name(), urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_spec() -> FilterSpec {
        FilterSpec {
            priority: Some("high".to_string()),
            status: Some("pending".to_string()),
            search: Some("budget".to_string()),
            due_date_gte: Some("2024-01-01".to_string()),
            due_date_lte: Some("2024-12-31".to_string()),
            ordering: Some("-due_date".to_string()),
        }
    }

    #[test]
    fn editing_one_field_preserves_the_others() {
        let spec = full_spec();
        let next = spec.apply(FilterEdit::set(FilterField::Status, "completed"));

        assert_eq!(next.status.as_deref(), Some("completed"));
        assert_eq!(next.priority, spec.priority);
        assert_eq!(next.search, spec.search);
        assert_eq!(next.due_date_gte, spec.due_date_gte);
        assert_eq!(next.due_date_lte, spec.due_date_lte);
        assert_eq!(next.ordering, spec.ordering);
    }

    #[test]
    fn clearing_a_field_sets_it_absent() {
        let spec = full_spec();

        let cleared = spec.apply(FilterEdit::clear(FilterField::Search));
        assert_eq!(cleared.search, None);

        let emptied = spec.apply(FilterEdit::set(FilterField::Priority, ""));
        assert_eq!(emptied.priority, None);
        assert_eq!(emptied.status, spec.status);
    }

    #[test]
    fn order_defaults_to_created_at_descending() {
        assert_eq!(FilterSpec::default().order(), OrderDirective::default_order());
        assert_eq!(
            OrderDirective::parse("-priority"),
            OrderDirective {
                field: "priority".to_string(),
                descending: true
            }
        );
        assert!(!OrderDirective::parse("due_date").descending);
    }

    #[test]
    fn params_with_blank_values_are_unset() {
        let params = FilterParams {
            priority: Some("".to_string()),
            status: Some("  ".to_string()),
            search: Some("report".to_string()),
            ..Default::default()
        };
        let spec = FilterSpec::from(params);
        assert_eq!(spec.priority, None);
        assert_eq!(spec.status, None);
        assert_eq!(spec.search.as_deref(), Some("report"));
    }

    #[test]
    fn unknown_priority_is_kept_as_given() {
        let params = FilterParams {
            priority: Some("urgent".to_string()),
            ..Default::default()
        };
        let spec = FilterSpec::from(params);
        assert_eq!(spec.priority.as_deref(), Some("urgent"));

        let edited = FilterSpec::default().apply(FilterEdit::set(FilterField::Priority, "urgent"));
        assert_eq!(edited.priority.as_deref(), Some("urgent"));
    }

    #[test]
    fn query_string_encodes_set_fields_only() {
        let spec = FilterSpec {
            search: Some("q3 budget".to_string()),
            priority: Some("low".to_string()),
            ..Default::default()
        };
        assert_eq!(spec.to_query_string(), "search=q3%20budget&priority=low");
        assert_eq!(FilterSpec::default().to_query_string(), "");
    }

    #[test]
    fn field_names_match_query_parameters() {
        let names: Vec<&str> = FilterField::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec!["search", "priority", "status", "due_date_gte", "due_date_lte", "ordering"]
        );
    }
}
