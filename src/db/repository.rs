//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing different
//! storage backends to be swapped without changing business logic.
//!
//! Methods return `impl Future + Send` so that handlers generic over
//! [`Database`] can be spawned and served by axum.

use std::future::Future;

use crate::db::{
    DbResult,
    models::{
        ApiKey, CalendarSubscription, Family, FamilyMember, ListResult, ScheduleEntry,
        ScheduleQuery, SharedList, SharedListItem, Task, TaskQuery, TaskStatus, UpsertOutcome,
    },
};

/// Repository for Family operations.
pub trait FamilyRepository {
    /// Create a new family. Empty id/timestamps are generated.
    fn create(&self, family: &Family) -> impl Future<Output = DbResult<Family>> + Send;

    /// Get a family by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<Family>> + Send;

    /// Get all families.
    fn list(&self) -> impl Future<Output = DbResult<Vec<Family>>> + Send;

    /// Update an existing family.
    fn update(&self, family: &Family) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete a family and everything it owns.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for FamilyMember operations.
pub trait MemberRepository {
    /// Add a member to a family.
    fn create(&self, member: &FamilyMember)
    -> impl Future<Output = DbResult<FamilyMember>> + Send;

    /// Get a member by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<FamilyMember>> + Send;

    /// Get all members of a family, parents first.
    fn list_by_family(
        &self,
        family_id: &str,
    ) -> impl Future<Output = DbResult<Vec<FamilyMember>>> + Send;

    /// Update an existing member.
    fn update(&self, member: &FamilyMember) -> impl Future<Output = DbResult<()>> + Send;

    /// Remove a member.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for ScheduleEntry operations.
pub trait ScheduleRepository {
    /// Create a manual entry.
    fn create(
        &self,
        entry: &ScheduleEntry,
    ) -> impl Future<Output = DbResult<ScheduleEntry>> + Send;

    /// Get an entry by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<ScheduleEntry>> + Send;

    /// List entries ordered by date then start time.
    fn list(
        &self,
        query: Option<&ScheduleQuery>,
    ) -> impl Future<Output = DbResult<ListResult<ScheduleEntry>>> + Send;

    /// Update an existing entry.
    fn update(&self, entry: &ScheduleEntry) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete an entry by ID.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Insert or overwrite the entry keyed by
    /// `(external_source_id, external_uid)`.
    ///
    /// Rows whose synced fields already match are left untouched, including
    /// their `last_synced_at`.
    fn upsert_external(
        &self,
        entry: &ScheduleEntry,
    ) -> impl Future<Output = DbResult<UpsertOutcome>> + Send;

    /// Delete entries of `source_id` whose external UID is not in `keep_uids`.
    ///
    /// Returns the number of deleted rows.
    fn delete_external_except(
        &self,
        source_id: &str,
        keep_uids: &[String],
    ) -> impl Future<Output = DbResult<u64>> + Send;
}

/// Repository for CalendarSubscription operations.
pub trait SubscriptionRepository {
    /// Create a subscription.
    fn create(
        &self,
        subscription: &CalendarSubscription,
    ) -> impl Future<Output = DbResult<CalendarSubscription>> + Send;

    /// Get a subscription by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<CalendarSubscription>> + Send;

    /// All subscriptions across every family.
    fn list(&self) -> impl Future<Output = DbResult<Vec<CalendarSubscription>>> + Send;

    /// Subscriptions of every member of a family.
    fn list_by_family(
        &self,
        family_id: &str,
    ) -> impl Future<Output = DbResult<Vec<CalendarSubscription>>> + Send;

    /// Subscriptions of one member.
    fn list_by_owner(
        &self,
        owner_id: &str,
    ) -> impl Future<Output = DbResult<Vec<CalendarSubscription>>> + Send;

    /// Record a successful reconciliation.
    fn mark_synced(
        &self,
        id: &str,
        synced_at: &str,
    ) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete a subscription. Entries it produced are left in place.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for Task operations.
pub trait TaskRepository {
    /// Create a new task.
    fn create(&self, task: &Task) -> impl Future<Output = DbResult<Task>> + Send;

    /// Get a task by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<Task>> + Send;

    /// List tasks ordered by due date, then newest first.
    fn list(
        &self,
        query: Option<&TaskQuery>,
    ) -> impl Future<Output = DbResult<ListResult<Task>>> + Send;

    /// Update an existing task.
    fn update(&self, task: &Task) -> impl Future<Output = DbResult<()>> + Send;

    /// Change status, maintaining `completed_at`.
    fn set_status(
        &self,
        id: &str,
        status: TaskStatus,
    ) -> impl Future<Output = DbResult<Task>> + Send;

    /// Delete a task by ID.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for SharedList and SharedListItem operations.
pub trait SharedListRepository {
    /// Create a list.
    fn create(&self, list: &SharedList) -> impl Future<Output = DbResult<SharedList>> + Send;

    /// Get a list by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<SharedList>> + Send;

    /// Lists of a family, most recently updated first.
    fn list_by_family(
        &self,
        family_id: &str,
    ) -> impl Future<Output = DbResult<Vec<SharedList>>> + Send;

    /// Update name, description and colour.
    fn update(&self, list: &SharedList) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete a list and its items.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Append items. Texts are trimmed and blank ones dropped.
    fn add_items(
        &self,
        list_id: &str,
        texts: &[String],
    ) -> impl Future<Output = DbResult<Vec<SharedListItem>>> + Send;

    /// Get an item by ID.
    fn get_item(&self, id: &str) -> impl Future<Output = DbResult<SharedListItem>> + Send;

    /// Items of a list, unchecked first then oldest first.
    fn list_items(
        &self,
        list_id: &str,
    ) -> impl Future<Output = DbResult<Vec<SharedListItem>>> + Send;

    /// Replace an item's text.
    fn update_item_text(
        &self,
        id: &str,
        text: &str,
    ) -> impl Future<Output = DbResult<SharedListItem>> + Send;

    /// Check or uncheck an item.
    fn set_item_checked(
        &self,
        id: &str,
        checked: bool,
        checked_by: Option<&str>,
    ) -> impl Future<Output = DbResult<SharedListItem>> + Send;

    /// Delete an item.
    fn delete_item(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;
}

/// Repository for MCP API keys.
pub trait ApiKeyRepository {
    /// Store a new key (hash only).
    fn create(&self, key: &ApiKey) -> impl Future<Output = DbResult<ApiKey>> + Send;

    /// Get a key by ID.
    fn get(&self, id: &str) -> impl Future<Output = DbResult<ApiKey>> + Send;

    /// Look up a key by the SHA-256 hash of its plaintext.
    fn find_by_hash(&self, hash: &str)
    -> impl Future<Output = DbResult<Option<ApiKey>>> + Send;

    /// Keys of a family, newest first.
    fn list_by_family(
        &self,
        family_id: &str,
    ) -> impl Future<Output = DbResult<Vec<ApiKey>>> + Send;

    /// Deactivate a key without deleting it.
    fn revoke(&self, id: &str) -> impl Future<Output = DbResult<ApiKey>> + Send;

    /// Record a successful authentication.
    fn touch(&self, id: &str, used_at: &str) -> impl Future<Output = DbResult<()>> + Send;

    /// Delete a key.
    fn delete(&self, id: &str) -> impl Future<Output = DbResult<()>> + Send;
}

/// Combined database interface.
///
/// Repositories are exposed through generic associated types, so callers
/// generic over `D: Database` pay no dynamic dispatch.
pub trait Database: Send + Sync {
    type Families<'a>: FamilyRepository + Send + Sync
    where
        Self: 'a;
    type Members<'a>: MemberRepository + Send + Sync
    where
        Self: 'a;
    type Schedules<'a>: ScheduleRepository + Send + Sync
    where
        Self: 'a;
    type Subscriptions<'a>: SubscriptionRepository + Send + Sync
    where
        Self: 'a;
    type Tasks<'a>: TaskRepository + Send + Sync
    where
        Self: 'a;
    type SharedLists<'a>: SharedListRepository + Send + Sync
    where
        Self: 'a;
    type ApiKeys<'a>: ApiKeyRepository + Send + Sync
    where
        Self: 'a;

    /// Run pending migrations.
    fn migrate(&self) -> impl Future<Output = DbResult<()>> + Send;

    fn families(&self) -> Self::Families<'_>;

    fn members(&self) -> Self::Members<'_>;

    fn schedules(&self) -> Self::Schedules<'_>;

    fn subscriptions(&self) -> Self::Subscriptions<'_>;

    fn tasks(&self) -> Self::Tasks<'_>;

    fn shared_lists(&self) -> Self::SharedLists<'_>;

    fn api_keys(&self) -> Self::ApiKeys<'_>;
}
