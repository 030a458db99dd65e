//! Database utility functions.

use chrono::Utc;
use rand::Rng;

/// Generate an 8-character hex ID for database entities.
pub fn generate_entity_id() -> String {
    format!("{:08x}", rand::thread_rng().r#gen::<u32>())
}

/// Get current datetime as string in SQLite format.
pub fn current_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Use the caller's value unless it is empty.
///
/// Lets sync/import paths keep their ids and timestamps while normal
/// creation passes empty strings and gets fresh ones.
pub(crate) fn or_generate(value: &str, generate: impl FnOnce() -> String) -> String {
    if value.is_empty() {
        generate()
    } else {
        value.to_string()
    }
}
