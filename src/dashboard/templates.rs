//! HTML templates for the web dashboard.
//!
//! Templates are embedded at compile time using `include_str!` and filled
//! with `{{placeholder}}` substitution.

/// Page shell with header and styles. Placeholders: `title`, `content`.
pub const BASE_TEMPLATE: &str = include_str!("templates/base.html");

/// Task list page body: filter form and the results area that loads itself.
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// Task detail body with comments and attachments.
pub const TASK_DETAIL_TEMPLATE: &str = include_str!("templates/task_detail.html");

/// Fill `{{name}}` placeholders in one pass over the template.
///
/// Inserted values are never scanned again, so text that itself contains
/// `{{...}}` comes out verbatim. Unknown placeholders are left in place.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };
        let name = &after[..end];
        match values.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Wrap a page body in the base layout. `title` must already be escaped.
pub fn page(title: &str, content: &str) -> String {
    fill(BASE_TEMPLATE, &[("title", title), ("content", content)])
}
