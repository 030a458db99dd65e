//! Domain models for the famille database.
//!
//! These models are storage-agnostic and represent the core entities
//! used throughout the application.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::schedule::WallTime;

// =============================================================================
// Query Types for Pagination and Sorting
// =============================================================================

/// Sort order for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Base pagination and sorting options - composed into entity-specific queries.
#[derive(Debug, Clone, Default)]
pub struct PageSort {
    /// Maximum number of items to return.
    pub limit: Option<usize>,
    /// Number of items to skip.
    pub offset: Option<usize>,
    /// Field to sort by (validated per entity type).
    pub sort_by: Option<String>,
    /// Sort order (ascending or descending).
    pub sort_order: Option<SortOrder>,
}

/// Query for schedule entries.
///
/// Filters combine with AND. `from`/`to` are inclusive day bounds.
#[derive(Debug, Clone, Default)]
pub struct ScheduleQuery {
    pub page: PageSort,
    pub family_id: Option<String>,
    pub owner_id: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    /// Only entries produced by this calendar subscription.
    pub external_source_id: Option<String>,
}

/// Query for family tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub page: PageSort,
    pub family_id: Option<String>,
    pub assigned_to: Option<String>,
    /// Filter by status (pending, in_progress, completed).
    pub status: Option<TaskStatus>,
}

/// Result of a paginated list query.
#[derive(Debug, Clone)]
pub struct ListResult<T> {
    /// The items in this page.
    pub items: Vec<T>,
    /// Total count of all matching items (before pagination).
    pub total: usize,
    /// Limit that was applied.
    pub limit: Option<usize>,
    /// Offset that was applied.
    pub offset: usize,
}

/// 8-character hex ID type used for all entities.
pub type Id = String;

// =============================================================================
// Families
// =============================================================================

/// A household sharing calendars, tasks and lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    pub id: Id,
    pub name: String,
    pub created_at: String,
}

/// A person belonging to a family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: Id,
    pub family_id: Id,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: MemberRole,
    pub avatar_url: Option<String>,
    pub created_at: String,
}

impl FamilyMember {
    /// Human-readable label: name, then email, then a short id.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| format!("Membre {}", self.id))
    }
}

/// Role of a family member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Parent,
    #[default]
    Child,
}

impl std::fmt::Display for MemberRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberRole::Parent => write!(f, "parent"),
            MemberRole::Child => write!(f, "child"),
        }
    }
}

impl std::str::FromStr for MemberRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parent" => Ok(MemberRole::Parent),
            "child" => Ok(MemberRole::Child),
            _ => Err(format!("Unknown member role: {}", s)),
        }
    }
}

// =============================================================================
// Calendars
// =============================================================================

/// One calendar event belonging to a family member.
///
/// Entries with `external_source_id` set were produced by calendar
/// reconciliation and only their `location` may be edited by users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: Id,
    pub owner_id: Id,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date: NaiveDate,
    pub start_time: WallTime,
    pub end_time: WallTime,
    pub external_source_id: Option<Id>,
    pub external_uid: Option<String>,
    pub last_synced_at: Option<String>,
    pub created_at: String,
}

impl ScheduleEntry {
    /// Whether this entry is owned by calendar reconciliation.
    pub fn is_external(&self) -> bool {
        self.external_source_id.is_some()
    }
}

/// Default colour for new calendar subscriptions.
pub const DEFAULT_SUBSCRIPTION_COLOR: &str = "#3b82f6";

/// An external iCalendar feed mirrored into a member's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSubscription {
    pub id: Id,
    pub owner_id: Id,
    pub url: String,
    pub display_name: String,
    pub color: String,
    pub last_synced_at: Option<String>,
    pub created_at: String,
}

/// What an external upsert did to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    Unchanged,
}

// =============================================================================
// Tasks
// =============================================================================

/// A chore or to-do shared by the family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Id,
    pub family_id: Id,
    pub assigned_to: Option<Id>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

/// Status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::InProgress => write!(f, "in_progress"),
            TaskStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(format!("Invalid TaskStatus: {}", s)),
        }
    }
}

// =============================================================================
// Shared lists
// =============================================================================

/// Default colour for new shared lists.
pub const DEFAULT_LIST_COLOR: &str = "#3b82f6";

/// A shared checklist (groceries, packing, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedList {
    pub id: Id,
    pub family_id: Id,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One line of a shared checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedListItem {
    pub id: Id,
    pub list_id: Id,
    pub text: String,
    pub checked: bool,
    pub checked_at: Option<String>,
    pub checked_by: Option<Id>,
    pub created_at: String,
}

// =============================================================================
// MCP API keys
// =============================================================================

/// A hashed credential granting MCP access to one family.
///
/// The plaintext key is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: Id,
    pub family_id: Id,
    pub key_prefix: String,
    #[serde(skip_serializing, default)]
    pub key_hash: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub last_used_at: Option<String>,
    pub expires_at: Option<String>,
    pub created_at: String,
}

impl ApiKey {
    /// Display form that never reveals the secret part.
    pub fn masked(&self) -> String {
        format!("fml_{}_****", self.key_prefix)
    }
}
