//! MCP tool implementations
//!
//! One tool struct per entity. Tools that create or list family data take a
//! `member_id` and act on that member's family. Every tool method takes the
//! caller's [`FamilyScope`] and refuses ids from other families.

mod calendars;
mod schedules;
mod shared_lists;
mod tasks;


pub use calendars::*;
pub use schedules::*;
pub use shared_lists::*;
pub use tasks::*;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use serde_json::json;

use crate::db::{
    Database, DbError, FamilyMember, MemberRepository, SharedList, SharedListRepository,
};
use crate::mcp::FamilyScope;

/// Listing size when the caller does not ask for one.
pub const DEFAULT_LIMIT: usize = 10;
/// Upper bound on any listing, keeps tool output small.
pub const MAX_LIMIT: usize = 20;

pub(crate) fn apply_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

pub(crate) fn map_db_error(e: DbError) -> McpError {
    match e {
        DbError::NotFound { .. } => {
            McpError::resource_not_found("not_found", Some(json!({"error": e.to_string()})))
        }
        DbError::Validation { .. } | DbError::Constraint { .. } => {
            McpError::invalid_params("invalid", Some(json!({"error": e.to_string()})))
        }
        _ => McpError::internal_error("database_error", Some(json!({"error": e.to_string()}))),
    }
}

pub(crate) fn invalid(code: &'static str, error: impl std::fmt::Display) -> McpError {
    McpError::invalid_params(code, Some(json!({"error": error.to_string()})))
}

/// Pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error("serialization_error", Some(json!({"error": e.to_string()})))
    })?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

/// Look up a member of the caller's family.
pub(crate) async fn acting_member<D: Database>(
    db: &D,
    scope: &FamilyScope,
    member_id: &str,
) -> Result<FamilyMember, McpError> {
    let member = db.members().get(member_id).await.map_err(|e| match e {
        DbError::NotFound { .. } => McpError::resource_not_found(
            "member_not_found",
            Some(json!({"error": format!("Member '{}' not found", member_id)})),
        ),
        other => map_db_error(other),
    })?;
    scope.check(&member.family_id)?;
    Ok(member)
}

/// Look up a shared list of the caller's family.
pub(crate) async fn scoped_list<D: Database>(
    db: &D,
    scope: &FamilyScope,
    list_id: &str,
) -> Result<SharedList, McpError> {
    let list = db.shared_lists().get(list_id).await.map_err(map_db_error)?;
    scope.check(&list.family_id)?;
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(apply_limit(None), DEFAULT_LIMIT);
        assert_eq!(apply_limit(Some(5)), 5);
        assert_eq!(apply_limit(Some(0)), 1);
        assert_eq!(apply_limit(Some(500)), MAX_LIMIT);
    }
}
