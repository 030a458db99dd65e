//! Shared utilities for CLI commands

use tabled::{Table, settings::Style};

/// Truncate a string with ellipsis if it exceeds max length
pub fn truncate_with_ellipsis(s: &str, max: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// `-` for missing optional values
pub fn or_dash(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or("-")
        .to_string()
}

/// Warning badges for an annotated schedule entry.
pub fn conflict_badges(has_overlap: bool, has_back_to_back: bool) -> String {
    match (has_overlap, has_back_to_back) {
        (true, _) => "⚠ overlap".to_string(),
        (false, true) => "⏱ back-to-back".to_string(),
        (false, false) => String::new(),
    }
}

/// Apply consistent table styling
pub fn apply_table_style(table: &mut Table) {
    table.with(Style::rounded());
}
