//! Shared helper functions for SQLite repositories.

use crate::db::{PageSort, SortOrder};

/// Validate a requested sort field against the allowed column names.
/// Returns None for unknown fields (caller falls back to its default).
pub fn validate_sort_field(field: &str, allowed: &[&'static str]) -> Option<&'static str> {
    allowed.iter().copied().find(|allowed_field| *allowed_field == field)
}

/// Build ORDER BY clause from PageSort parameters.
///
/// `tie_break` is appended verbatim (e.g. `", start_time ASC"`) so listings
/// stay deterministic when the primary column has duplicates.
pub fn build_order_clause(
    page: &PageSort,
    allowed_fields: &[&'static str],
    default_field: &str,
    tie_break: &str,
) -> String {
    let sort_field = page
        .sort_by
        .as_deref()
        .and_then(|f| validate_sort_field(f, allowed_fields))
        .unwrap_or(default_field);

    let order = match page.sort_order.unwrap_or(SortOrder::Asc) {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };

    format!("ORDER BY {} {}{}", sort_field, order, tie_break)
}

/// Build LIMIT/OFFSET clause from PageSort parameters.
/// Note: SQL requires LIMIT when using OFFSET. If offset is provided without limit,
/// we use LIMIT -1 (SQLite's "no limit" value).
pub fn build_limit_offset_clause(page: &PageSort) -> String {
    let mut clause = String::new();

    let offset = page.offset.filter(|o| *o > 0);

    if let Some(limit) = page.limit {
        clause.push_str(&format!(" LIMIT {}", limit));
    } else if offset.is_some() {
        clause.push_str(" LIMIT -1");
    }

    if let Some(offset) = offset {
        clause.push_str(&format!(" OFFSET {}", offset));
    }

    clause
}

/// Build a WHERE clause from accumulated conditions.
pub fn build_where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}
