//! MCP server implementation
//!
//! The server owns one tool struct per entity and exposes their operations
//! through a single tool router.

use std::sync::Arc;

use axum::http::request::Parts;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        router::tool::ToolRouter,
        tool::Extension,
        wrapper::Parameters,
    },
    model::{CallToolResult, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::calendar::{HttpFeedSource, SyncConfig};
use crate::db::Database;

use super::scope::FamilyScope;
use super::tools::{
    AddSharedListItemsParams, CalendarTools, CreateScheduleParams, CreateSharedListParams,
    CreateTaskParams, DeleteScheduleParams, DeleteSharedListItemParams, DeleteTaskParams,
    ListCalendarSubscriptionsParams, ListSchedulesParams, ListSharedListsParams, ListTasksParams,
    ScheduleTools, SharedListIdParams, SharedListTools, SyncCalendarSubscriptionParams,
    TaskTools, ToggleSharedListItemParams, UpdateTaskStatusParams,
};

/// Main MCP server coordinator
///
/// Generic over `D: Database`; every tool struct shares the same `Arc<D>`.
/// Each tool call is limited to the [`FamilyScope`] the API key guard put on
/// the HTTP request.
pub struct McpServer<D: Database> {
    tasks: TaskTools<D>,
    schedules: ScheduleTools<D>,
    shared_lists: SharedListTools<D>,
    calendars: CalendarTools<D>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl<D: Database + 'static> McpServer<D> {
    pub fn new(db: Arc<D>, feed: Arc<HttpFeedSource>, sync: SyncConfig) -> Self {
        Self {
            tasks: TaskTools::new(Arc::clone(&db)),
            schedules: ScheduleTools::new(Arc::clone(&db), sync.timezone),
            shared_lists: SharedListTools::new(Arc::clone(&db)),
            calendars: CalendarTools::new(db, feed, sync),
            tool_router: Self::tool_router(),
        }
    }

    // ----- tasks -----

    #[tool(
        description = "List the family's tasks, soonest due first. Filter by status or only the asking member's tasks."
    )]
    pub async fn list_tasks(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<ListTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.tasks.list_tasks(&scope, params).await
    }

    #[tool(description = "Create a pending task in the member's family.")]
    pub async fn create_task(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<CreateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.tasks.create_task(&scope, params).await
    }

    #[tool(
        description = "Change a task's status. 'completed' records completed_at; any other status clears it."
    )]
    pub async fn update_task_status(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<UpdateTaskStatusParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.tasks.update_task_status(&scope, params).await
    }

    #[tool(description = "Delete a task.")]
    pub async fn delete_task(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<DeleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.tasks.delete_task(&scope, params).await
    }

    // ----- schedules -----

    #[tool(
        description = "List the family schedule for a day or week. Each entry carries has_overlap (clashes with any entry) and has_back_to_back (same member, 30 minutes or less between entries)."
    )]
    pub async fn list_schedules(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<ListSchedulesParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.schedules.list_schedules(&scope, params).await
    }

    #[tool(description = "Add a manual schedule entry for a member. Times are HH:MM, start before end.")]
    pub async fn create_schedule(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<CreateScheduleParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.schedules.create_schedule(&scope, params).await
    }

    #[tool(
        description = "Delete a manual schedule entry. Entries synced from a calendar subscription are refused."
    )]
    pub async fn delete_schedule(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<DeleteScheduleParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.schedules.delete_schedule(&scope, params).await
    }

    // ----- shared lists -----

    #[tool(description = "List the family's shared checklists, most recently changed first.")]
    pub async fn list_shared_lists(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<ListSharedListsParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.shared_lists.list_shared_lists(&scope, params).await
    }

    #[tool(description = "Create a shared checklist for the member's family.")]
    pub async fn create_shared_list(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<CreateSharedListParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.shared_lists.create_shared_list(&scope, params).await
    }

    #[tool(description = "Delete a shared checklist and all its items.")]
    pub async fn delete_shared_list(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<SharedListIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.shared_lists.delete_shared_list(&scope, params).await
    }

    #[tool(description = "Show a checklist with its items, unchecked first.")]
    pub async fn list_shared_list_items(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<SharedListIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.shared_lists.list_shared_list_items(&scope, params).await
    }

    #[tool(description = "Add several items to a checklist at once.")]
    pub async fn add_shared_list_items(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<AddSharedListItemsParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.shared_lists.add_shared_list_items(&scope, params).await
    }

    #[tool(description = "Tick or untick a checklist item.")]
    pub async fn toggle_shared_list_item(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<ToggleSharedListItemParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.shared_lists.toggle_shared_list_item(&scope, params).await
    }

    #[tool(description = "Remove an item from a checklist.")]
    pub async fn delete_shared_list_item(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<DeleteSharedListItemParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.shared_lists.delete_shared_list_item(&scope, params).await
    }

    // ----- calendars -----

    #[tool(description = "List the family's external calendar subscriptions.")]
    pub async fn list_calendar_subscriptions(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<ListCalendarSubscriptionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.calendars.list_calendar_subscriptions(&scope, params).await
    }

    #[tool(
        description = "Fetch a subscription's iCalendar feed now and mirror it into the schedule. Returns counts of inserted, updated, unchanged, skipped and deleted entries."
    )]
    pub async fn sync_calendar_subscription(
        &self,
        Extension(parts): Extension<Parts>,
        params: Parameters<SyncCalendarSubscriptionParams>,
    ) -> Result<CallToolResult, McpError> {
        let scope = FamilyScope::from_parts(&parts)?;
        self.calendars.sync_calendar_subscription(&scope, params).await
    }
}

#[tool_handler]
impl<D: Database + 'static> ServerHandler for McpServer<D> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build()).with_instructions(
            "Famille MCP Server - family tasks, schedules with conflict warnings, shared checklists and calendar sync. Pass the acting member's ID as member_id."
                .to_string(),
        )
    }
}
