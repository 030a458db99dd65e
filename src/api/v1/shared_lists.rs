//! Shared checklist handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::db::{Database, FamilyRepository, SharedList, SharedListItem, SharedListRepository};

use super::{ApiResult, ErrorResponse, db_error, error_response};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharedListResponse {
    #[schema(example = "c3d4e5f6")]
    pub id: String,
    #[schema(example = "a1b2c3d4")]
    pub family_id: String,
    #[schema(example = "Courses")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = "#3b82f6")]
    pub color: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SharedList> for SharedListResponse {
    fn from(l: SharedList) -> Self {
        Self {
            id: l.id,
            family_id: l.family_id,
            name: l.name,
            description: l.description,
            color: l.color,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SharedListItemResponse {
    pub id: String,
    pub list_id: String,
    #[schema(example = "Lait")]
    pub text: String,
    pub checked: bool,
    pub checked_at: Option<String>,
    /// Member who ticked the item
    pub checked_by: Option<String>,
    pub created_at: String,
}

impl From<SharedListItem> for SharedListItemResponse {
    fn from(i: SharedListItem) -> Self {
        Self {
            id: i.id,
            list_id: i.list_id,
            text: i.text,
            checked: i.checked,
            checked_at: i.checked_at,
            checked_by: i.checked_by,
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSharedListRequest {
    #[schema(example = "Courses")]
    pub name: String,
    pub description: Option<String>,
    /// Defaults to #3b82f6
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchSharedListRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub color: Option<String>,
}

/// Add items request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddItemsRequest {
    /// One entry per item; blank entries are dropped
    #[schema(example = json!(["Lait", "Pain"]))]
    pub texts: Vec<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateItemRequest {
    #[schema(example = "Lait demi-écrémé")]
    pub text: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ToggleItemRequest {
    /// Member ticking the item, recorded when it becomes checked
    pub checked_by: Option<String>,
}

fn required_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "List name must not be empty",
        ));
    }
    Ok(name.to_string())
}

// =============================================================================
// List handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/families/{id}/shared-lists",
    tag = "shared-lists",
    params(("id" = String, Path, description = "Family ID")),
    responses(
        (status = 200, description = "Lists, most recently updated first", body = Vec<SharedListResponse>),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_shared_lists<D: Database>(
    State(state): State<AppState<D>>,
    Path(family_id): Path<String>,
) -> ApiResult<Json<Vec<SharedListResponse>>> {
    state
        .db()
        .families()
        .get(&family_id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", family_id)))?;

    let lists = state
        .db()
        .shared_lists()
        .list_by_family(&family_id)
        .await
        .map_err(|e| db_error(e, "Shared lists"))?;

    Ok(Json(lists.into_iter().map(SharedListResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/families/{id}/shared-lists",
    tag = "shared-lists",
    params(("id" = String, Path, description = "Family ID")),
    request_body = CreateSharedListRequest,
    responses(
        (status = 201, description = "List created", body = SharedListResponse),
        (status = 400, description = "Empty name", body = ErrorResponse),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_shared_list<D: Database>(
    State(state): State<AppState<D>>,
    Path(family_id): Path<String>,
    Json(req): Json<CreateSharedListRequest>,
) -> ApiResult<(StatusCode, Json<SharedListResponse>)> {
    let name = required_name(&req.name)?;

    state
        .db()
        .families()
        .get(&family_id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", family_id)))?;

    let list = SharedList {
        id: String::new(),
        family_id,
        name,
        description: req.description,
        color: req.color.unwrap_or_default(),
        created_at: String::new(),
        updated_at: String::new(),
    };

    let created = state
        .db()
        .shared_lists()
        .create(&list)
        .await
        .map_err(|e| db_error(e, "Shared list"))?;

    Ok((StatusCode::CREATED, Json(SharedListResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/shared-lists/{id}",
    tag = "shared-lists",
    params(("id" = String, Path, description = "List ID")),
    responses(
        (status = 200, description = "List found", body = SharedListResponse),
        (status = 404, description = "List not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_shared_list<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SharedListResponse>> {
    let list = state
        .db()
        .shared_lists()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &format!("Shared list '{}'", id)))?;

    Ok(Json(SharedListResponse::from(list)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/shared-lists/{id}",
    tag = "shared-lists",
    params(("id" = String, Path, description = "List ID")),
    request_body = PatchSharedListRequest,
    responses(
        (status = 200, description = "List updated", body = SharedListResponse),
        (status = 400, description = "Empty name", body = ErrorResponse),
        (status = 404, description = "List not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_shared_list<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    Json(req): Json<PatchSharedListRequest>,
) -> ApiResult<Json<SharedListResponse>> {
    let label = format!("Shared list '{}'", id);
    let repo = state.db().shared_lists();
    let mut list = repo.get(&id).await.map_err(|e| db_error(e, &label))?;

    if let Some(name) = req.name {
        list.name = required_name(&name)?;
    }
    if let Some(description) = req.description {
        list.description = description;
    }
    if let Some(color) = req.color {
        list.color = color;
    }

    repo.update(&list).await.map_err(|e| db_error(e, &label))?;
    // Re-read for the bumped updated_at.
    let list = repo.get(&id).await.map_err(|e| db_error(e, &label))?;

    Ok(Json(SharedListResponse::from(list)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/shared-lists/{id}",
    tag = "shared-lists",
    params(("id" = String, Path, description = "List ID")),
    responses(
        (status = 204, description = "List and its items deleted"),
        (status = 404, description = "List not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_shared_list<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db()
        .shared_lists()
        .delete(&id)
        .await
        .map_err(|e| db_error(e, &format!("Shared list '{}'", id)))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Item handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/shared-lists/{id}/items",
    tag = "shared-lists",
    params(("id" = String, Path, description = "List ID")),
    responses(
        (status = 200, description = "Items, unchecked first", body = Vec<SharedListItemResponse>),
        (status = 404, description = "List not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_items<D: Database>(
    State(state): State<AppState<D>>,
    Path(list_id): Path<String>,
) -> ApiResult<Json<Vec<SharedListItemResponse>>> {
    let repo = state.db().shared_lists();
    repo.get(&list_id)
        .await
        .map_err(|e| db_error(e, &format!("Shared list '{}'", list_id)))?;

    let items = repo
        .list_items(&list_id)
        .await
        .map_err(|e| db_error(e, "Shared list items"))?;

    Ok(Json(
        items.into_iter().map(SharedListItemResponse::from).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/shared-lists/{id}/items",
    tag = "shared-lists",
    params(("id" = String, Path, description = "List ID")),
    request_body = AddItemsRequest,
    responses(
        (status = 201, description = "Items added", body = Vec<SharedListItemResponse>),
        (status = 404, description = "List not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn add_items<D: Database>(
    State(state): State<AppState<D>>,
    Path(list_id): Path<String>,
    Json(req): Json<AddItemsRequest>,
) -> ApiResult<(StatusCode, Json<Vec<SharedListItemResponse>>)> {
    let items = state
        .db()
        .shared_lists()
        .add_items(&list_id, &req.texts)
        .await
        .map_err(|e| db_error(e, &format!("Shared list '{}'", list_id)))?;

    Ok((
        StatusCode::CREATED,
        Json(items.into_iter().map(SharedListItemResponse::from).collect()),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/shared-list-items/{id}",
    tag = "shared-lists",
    params(("id" = String, Path, description = "Item ID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Item text changed", body = SharedListItemResponse),
        (status = 400, description = "Empty text", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_item<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<SharedListItemResponse>> {
    let item = state
        .db()
        .shared_lists()
        .update_item_text(&id, &req.text)
        .await
        .map_err(|e| db_error(e, &format!("Item '{}'", id)))?;

    Ok(Json(SharedListItemResponse::from(item)))
}

/// Flip an item between checked and unchecked
#[utoipa::path(
    post,
    path = "/api/v1/shared-list-items/{id}/toggle",
    tag = "shared-lists",
    params(("id" = String, Path, description = "Item ID")),
    request_body = ToggleItemRequest,
    responses(
        (status = 200, description = "Item toggled", body = SharedListItemResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn toggle_item<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    Json(req): Json<ToggleItemRequest>,
) -> ApiResult<Json<SharedListItemResponse>> {
    let label = format!("Item '{}'", id);
    let repo = state.db().shared_lists();
    let item = repo.get_item(&id).await.map_err(|e| db_error(e, &label))?;

    let item = repo
        .set_item_checked(&id, !item.checked, req.checked_by.as_deref())
        .await
        .map_err(|e| db_error(e, &label))?;

    Ok(Json(SharedListItemResponse::from(item)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/shared-list-items/{id}",
    tag = "shared-lists",
    params(("id" = String, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 404, description = "Item not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_item<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db()
        .shared_lists()
        .delete_item(&id)
        .await
        .map_err(|e| db_error(e, &format!("Item '{}'", id)))?;

    Ok(StatusCode::NO_CONTENT)
}
