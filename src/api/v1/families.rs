//! Family management handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::db::{Database, Family, FamilyRepository};

use super::{ApiResult, ErrorResponse, db_error, error_response};

// =============================================================================
// DTOs
// =============================================================================

/// Family response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FamilyResponse {
    /// Unique identifier (8-character hex)
    #[schema(example = "a1b2c3d4")]
    pub id: String,
    #[schema(example = "Dupont")]
    pub name: String,
    #[schema(example = "2025-01-01 00:00:00")]
    pub created_at: String,
}

impl From<Family> for FamilyResponse {
    fn from(f: Family) -> Self {
        Self {
            id: f.id,
            name: f.name,
            created_at: f.created_at,
        }
    }
}

/// Create or rename family request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct FamilyRequest {
    #[schema(example = "Dupont")]
    pub name: String,
}

fn required_name(name: &str) -> ApiResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Family name must not be empty",
        ));
    }
    Ok(name.to_string())
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/families",
    tag = "families",
    responses(
        (status = 200, description = "All families", body = Vec<FamilyResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_families<D: Database>(
    State(state): State<AppState<D>>,
) -> ApiResult<Json<Vec<FamilyResponse>>> {
    let families = state
        .db()
        .families()
        .list()
        .await
        .map_err(|e| db_error(e, "Families"))?;

    Ok(Json(families.into_iter().map(FamilyResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/families/{id}",
    tag = "families",
    params(("id" = String, Path, description = "Family ID")),
    responses(
        (status = 200, description = "Family found", body = FamilyResponse),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_family<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<Json<FamilyResponse>> {
    let family = state
        .db()
        .families()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", id)))?;

    Ok(Json(FamilyResponse::from(family)))
}

#[utoipa::path(
    post,
    path = "/api/v1/families",
    tag = "families",
    request_body = FamilyRequest,
    responses(
        (status = 201, description = "Family created", body = FamilyResponse),
        (status = 400, description = "Empty name", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_family<D: Database>(
    State(state): State<AppState<D>>,
    Json(req): Json<FamilyRequest>,
) -> ApiResult<(StatusCode, Json<FamilyResponse>)> {
    let family = Family {
        id: String::new(),
        name: required_name(&req.name)?,
        created_at: String::new(),
    };

    let created = state
        .db()
        .families()
        .create(&family)
        .await
        .map_err(|e| db_error(e, "Family"))?;

    Ok((StatusCode::CREATED, Json(FamilyResponse::from(created))))
}

#[utoipa::path(
    put,
    path = "/api/v1/families/{id}",
    tag = "families",
    params(("id" = String, Path, description = "Family ID")),
    request_body = FamilyRequest,
    responses(
        (status = 200, description = "Family renamed", body = FamilyResponse),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn update_family<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    Json(req): Json<FamilyRequest>,
) -> ApiResult<Json<FamilyResponse>> {
    let label = format!("Family '{}'", id);
    let mut family = state
        .db()
        .families()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &label))?;

    family.name = required_name(&req.name)?;
    state
        .db()
        .families()
        .update(&family)
        .await
        .map_err(|e| db_error(e, &label))?;

    Ok(Json(FamilyResponse::from(family)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/families/{id}",
    tag = "families",
    params(("id" = String, Path, description = "Family ID")),
    responses(
        (status = 204, description = "Family and everything it owns deleted"),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_family<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db()
        .families()
        .delete(&id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", id)))?;

    Ok(StatusCode::NO_CONTENT)
}
