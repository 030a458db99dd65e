//! Family task handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;
use crate::db::{
    Database, FamilyRepository, PageSort, SortOrder, Task, TaskQuery, TaskRepository, TaskStatus,
};

use super::{ApiResult, ErrorResponse, db_error, error_response, parse_date};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskResponse {
    #[schema(example = "e5f6a7b8")]
    pub id: String,
    #[schema(example = "a1b2c3d4")]
    pub family_id: String,
    pub assigned_to: Option<String>,
    #[schema(example = "Sortir les poubelles")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "2025-03-14")]
    pub due_date: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            family_id: t.family_id,
            assigned_to: t.assigned_to,
            title: t.title,
            description: t.description,
            status: t.status.to_string(),
            due_date: t.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
            created_at: t.created_at,
            completed_at: t.completed_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    #[schema(example = "Sortir les poubelles")]
    pub title: String,
    pub description: Option<String>,
    /// Member the task is assigned to
    pub assigned_to: Option<String>,
    #[schema(example = "2025-03-14")]
    pub due_date: Option<String>,
}

/// Patch task request DTO (partial update)
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// `null` unassigns the task
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<String>)]
    pub assigned_to: Option<Option<String>>,
    /// `null` removes the due date
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<String>, example = "2025-03-14")]
    pub due_date: Option<Option<String>>,
    /// pending, in_progress or completed
    #[schema(example = "in_progress")]
    pub status: Option<String>,
}

impl PatchTaskRequest {
    fn merge_into(self, target: &mut Task) -> ApiResult<Option<TaskStatus>> {
        if let Some(title) = self.title {
            target.title = required_title(&title)?;
        }
        if let Some(description) = self.description {
            target.description = description;
        }
        if let Some(assigned_to) = self.assigned_to {
            target.assigned_to = assigned_to;
        }
        if let Some(due_date) = self.due_date {
            target.due_date = parse_date(due_date.as_deref())?;
        }
        self.status.as_deref().map(parse_status).transpose()
    }
}

/// Status change request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskStatusRequest {
    /// pending, in_progress or completed
    #[schema(example = "completed")]
    pub status: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTasksQuery {
    /// Filter by status (pending, in_progress, completed)
    #[param(example = "pending")]
    pub status: Option<String>,
    /// Filter by assigned member
    pub assigned_to: Option<String>,
    /// Maximum number of items to return
    #[param(example = 20)]
    pub limit: Option<usize>,
    /// Number of items to skip
    #[param(example = 0)]
    pub offset: Option<usize>,
    /// Field to sort by (title, status, due_date, created_at, completed_at)
    #[param(example = "due_date")]
    pub sort: Option<String>,
    /// Sort order (asc, desc)
    #[param(example = "asc")]
    pub order: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedTasks {
    pub items: Vec<TaskResponse>,
    pub total: usize,
    pub limit: Option<usize>,
    pub offset: usize,
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_status(s: &str) -> ApiResult<TaskStatus> {
    s.parse()
        .map_err(|e: String| error_response(StatusCode::BAD_REQUEST, e))
}

fn required_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Title must not be empty",
        ));
    }
    Ok(title.to_string())
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/families/{id}/tasks",
    tag = "tasks",
    params(
        ("id" = String, Path, description = "Family ID"),
        ListTasksQuery
    ),
    responses(
        (status = 200, description = "Tasks by due date, then newest", body = PaginatedTasks),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_tasks<D: Database>(
    State(state): State<AppState<D>>,
    Path(family_id): Path<String>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<PaginatedTasks>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;

    let db_query = TaskQuery {
        page: PageSort {
            limit: query.limit,
            offset: query.offset,
            sort_by: query.sort.clone(),
            sort_order: match query.order.as_deref() {
                Some("desc") => Some(SortOrder::Desc),
                Some("asc") => Some(SortOrder::Asc),
                _ => None,
            },
        },
        family_id: Some(family_id),
        assigned_to: query.assigned_to.clone(),
        status,
    };

    let result = state
        .db()
        .tasks()
        .list(Some(&db_query))
        .await
        .map_err(|e| db_error(e, "Tasks"))?;

    Ok(Json(PaginatedTasks {
        items: result.items.into_iter().map(TaskResponse::from).collect(),
        total: result.total,
        limit: result.limit,
        offset: result.offset,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task found", body = TaskResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_task<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    let task = state
        .db()
        .tasks()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &format!("Task '{}'", id)))?;

    Ok(Json(TaskResponse::from(task)))
}

#[utoipa::path(
    post,
    path = "/api/v1/families/{id}/tasks",
    tag = "tasks",
    params(("id" = String, Path, description = "Family ID")),
    request_body = CreateTaskRequest,
    responses(
        (status = 201, description = "Task created as pending", body = TaskResponse),
        (status = 400, description = "Invalid title or date", body = ErrorResponse),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_task<D: Database>(
    State(state): State<AppState<D>>,
    Path(family_id): Path<String>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let title = required_title(&req.title)?;
    let due_date = parse_date(req.due_date.as_deref())?;

    state
        .db()
        .families()
        .get(&family_id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", family_id)))?;

    let task = Task {
        id: String::new(),
        family_id,
        assigned_to: req.assigned_to,
        title,
        description: req.description,
        status: TaskStatus::Pending,
        due_date,
        created_at: String::new(),
        completed_at: None,
    };

    let created = state
        .db()
        .tasks()
        .create(&task)
        .await
        .map_err(|e| db_error(e, "Task"))?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(created))))
}

/// Partially update a task
///
/// A status change maintains `completed_at`.
#[utoipa::path(
    patch,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = PatchTaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskResponse),
        (status = 400, description = "Invalid field", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_task<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    Json(req): Json<PatchTaskRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let label = format!("Task '{}'", id);
    let mut task = state
        .db()
        .tasks()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &label))?;

    let status = req.merge_into(&mut task)?;

    state
        .db()
        .tasks()
        .update(&task)
        .await
        .map_err(|e| db_error(e, &label))?;

    let task = match status {
        Some(status) => state
            .db()
            .tasks()
            .set_status(&id, status)
            .await
            .map_err(|e| db_error(e, &label))?,
        None => task,
    };

    Ok(Json(TaskResponse::from(task)))
}

#[utoipa::path(
    put,
    path = "/api/v1/tasks/{id}/status",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    request_body = TaskStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = TaskResponse),
        (status = 400, description = "Invalid status", body = ErrorResponse),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_task_status<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    Json(req): Json<TaskStatusRequest>,
) -> ApiResult<Json<TaskResponse>> {
    let status = parse_status(&req.status)?;

    let task = state
        .db()
        .tasks()
        .set_status(&id, status)
        .await
        .map_err(|e| db_error(e, &format!("Task '{}'", id)))?;

    Ok(Json(TaskResponse::from(task)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/tasks/{id}",
    tag = "tasks",
    params(("id" = String, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 404, description = "Task not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_task<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db()
        .tasks()
        .delete(&id)
        .await
        .map_err(|e| db_error(e, &format!("Task '{}'", id)))?;

    Ok(StatusCode::NO_CONTENT)
}
