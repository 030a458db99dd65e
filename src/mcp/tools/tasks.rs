//! MCP tools for family tasks.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult, schemars,
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{acting_member, apply_limit, invalid, json_result, map_db_error};
use crate::db::{Database, PageSort, Task, TaskQuery, TaskRepository, TaskStatus};
use crate::mcp::FamilyScope;

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListTasksParams {
    #[schemars(description = "Member asking; tasks of their family are listed")]
    pub member_id: String,
    #[schemars(description = "Filter by status: 'pending', 'in_progress' or 'completed'")]
    pub status: Option<String>,
    #[schemars(description = "Only tasks assigned to the asking member")]
    pub only_mine: Option<bool>,
    #[schemars(description = "Maximum number of tasks to return (default: 10, max: 20)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateTaskParams {
    #[schemars(description = "Member creating the task; it is added to their family")]
    pub member_id: String,
    #[schemars(description = "What needs to be done")]
    pub title: String,
    #[schemars(description = "Longer description (optional)")]
    pub description: Option<String>,
    #[schemars(description = "Member ID to assign the task to (optional)")]
    pub assigned_to: Option<String>,
    #[schemars(description = "Due date as YYYY-MM-DD (optional)")]
    pub due_date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateTaskStatusParams {
    #[schemars(description = "Task ID")]
    pub task_id: String,
    #[schemars(
        description = "New status: 'pending', 'in_progress' or 'completed' (sets completed_at)"
    )]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteTaskParams {
    #[schemars(description = "Task ID to delete")]
    pub task_id: String,
}

// =============================================================================
// Task Tools
// =============================================================================

pub struct TaskTools<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for TaskTools<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

impl<D: Database + 'static> TaskTools<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    async fn scoped_task(&self, scope: &FamilyScope, task_id: &str) -> Result<Task, McpError> {
        let task = self.db.tasks().get(task_id).await.map_err(map_db_error)?;
        scope.check(&task.family_id)?;
        Ok(task)
    }

    pub async fn list_tasks(
        &self,
        scope: &FamilyScope,
        params: Parameters<ListTasksParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let member = acting_member(&*self.db, scope, &params.member_id).await?;
        let status = params
            .status
            .as_deref()
            .map(|s| s.parse::<TaskStatus>())
            .transpose()
            .map_err(|e| invalid("invalid_status", e))?;

        let query = TaskQuery {
            page: PageSort {
                limit: Some(apply_limit(params.limit)),
                ..Default::default()
            },
            family_id: Some(member.family_id),
            assigned_to: params.only_mine.unwrap_or(false).then_some(member.id),
            status,
        };

        let result = self
            .db
            .tasks()
            .list(Some(&query))
            .await
            .map_err(map_db_error)?;

        json_result(&json!({
            "items": result.items,
            "total": result.total,
            "limit": result.limit,
            "offset": result.offset,
        }))
    }

    pub async fn create_task(
        &self,
        scope: &FamilyScope,
        params: Parameters<CreateTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let member = acting_member(&*self.db, scope, &params.member_id).await?;

        let title = params.title.trim();
        if title.is_empty() {
            return Err(invalid("invalid_title", "Title must not be empty"));
        }
        if let Some(assignee) = params.assigned_to.as_deref() {
            acting_member(&*self.db, scope, assignee).await?;
        }
        let due_date = params
            .due_date
            .as_deref()
            .map(|d| chrono::NaiveDate::parse_from_str(d, "%Y-%m-%d"))
            .transpose()
            .map_err(|e| invalid("invalid_date", e))?;

        let task = Task {
            id: String::new(),
            family_id: member.family_id,
            assigned_to: params.assigned_to,
            title: title.to_string(),
            description: params.description,
            status: TaskStatus::Pending,
            due_date,
            created_at: String::new(),
            completed_at: None,
        };

        let created = self.db.tasks().create(&task).await.map_err(map_db_error)?;
        json_result(&created)
    }

    pub async fn update_task_status(
        &self,
        scope: &FamilyScope,
        params: Parameters<UpdateTaskStatusParams>,
    ) -> Result<CallToolResult, McpError> {
        self.scoped_task(scope, &params.0.task_id).await?;
        let status: TaskStatus = params
            .0
            .status
            .parse()
            .map_err(|e| invalid("invalid_status", e))?;

        let task = self
            .db
            .tasks()
            .set_status(&params.0.task_id, status)
            .await
            .map_err(map_db_error)?;

        json_result(&task)
    }

    pub async fn delete_task(
        &self,
        scope: &FamilyScope,
        params: Parameters<DeleteTaskParams>,
    ) -> Result<CallToolResult, McpError> {
        self.scoped_task(scope, &params.0.task_id).await?;
        self.db
            .tasks()
            .delete(&params.0.task_id)
            .await
            .map_err(map_db_error)?;

        json_result(&json!({"deleted": params.0.task_id}))
    }
}
