//! Family member handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::db::{Database, FamilyMember, FamilyRepository, MemberRepository, MemberRole};

use super::{ApiResult, ErrorResponse, db_error, error_response};

// =============================================================================
// DTOs
// =============================================================================

/// Family member response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberResponse {
    #[schema(example = "b2c3d4e5")]
    pub id: String,
    #[schema(example = "a1b2c3d4")]
    pub family_id: String,
    #[schema(example = "Léa")]
    pub name: Option<String>,
    pub email: Option<String>,
    /// parent or child
    #[schema(example = "child")]
    pub role: String,
    pub avatar_url: Option<String>,
    /// Name, email or a placeholder, whichever is set first
    #[schema(example = "Léa")]
    pub display_name: String,
    pub created_at: String,
}

impl From<FamilyMember> for MemberResponse {
    fn from(m: FamilyMember) -> Self {
        Self {
            display_name: m.display_name(),
            id: m.id,
            family_id: m.family_id,
            name: m.name,
            email: m.email,
            role: m.role.to_string(),
            avatar_url: m.avatar_url,
            created_at: m.created_at,
        }
    }
}

/// Add member request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMemberRequest {
    #[schema(example = "Léa")]
    pub name: Option<String>,
    pub email: Option<String>,
    /// parent or child (default: child)
    #[schema(example = "child")]
    pub role: Option<String>,
    pub avatar_url: Option<String>,
}

/// Patch member request DTO
///
/// Omitted fields are left alone; `null` clears optional fields.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchMemberRequest {
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Option<String>>,
    #[schema(example = "parent")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<String>)]
    pub avatar_url: Option<Option<String>>,
}

impl PatchMemberRequest {
    fn merge_into(self, target: &mut FamilyMember) -> ApiResult<()> {
        if let Some(name) = self.name {
            target.name = name;
        }
        if let Some(email) = self.email {
            target.email = email;
        }
        if let Some(role) = self.role {
            target.role = parse_role(&role)?;
        }
        if let Some(avatar_url) = self.avatar_url {
            target.avatar_url = avatar_url;
        }
        Ok(())
    }
}

fn parse_role(role: &str) -> ApiResult<MemberRole> {
    role.parse()
        .map_err(|e: String| error_response(StatusCode::BAD_REQUEST, e))
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/families/{id}/members",
    tag = "members",
    params(("id" = String, Path, description = "Family ID")),
    responses(
        (status = 200, description = "Members, parents first", body = Vec<MemberResponse>),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_members<D: Database>(
    State(state): State<AppState<D>>,
    Path(family_id): Path<String>,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    state
        .db()
        .families()
        .get(&family_id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", family_id)))?;

    let members = state
        .db()
        .members()
        .list_by_family(&family_id)
        .await
        .map_err(|e| db_error(e, "Members"))?;

    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/families/{id}/members",
    tag = "members",
    params(("id" = String, Path, description = "Family ID")),
    request_body = CreateMemberRequest,
    responses(
        (status = 201, description = "Member added", body = MemberResponse),
        (status = 400, description = "Invalid role", body = ErrorResponse),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_member<D: Database>(
    State(state): State<AppState<D>>,
    Path(family_id): Path<String>,
    Json(req): Json<CreateMemberRequest>,
) -> ApiResult<(StatusCode, Json<MemberResponse>)> {
    let role = match req.role.as_deref() {
        Some(role) => parse_role(role)?,
        None => MemberRole::default(),
    };

    state
        .db()
        .families()
        .get(&family_id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", family_id)))?;

    let member = FamilyMember {
        id: String::new(),
        family_id,
        name: req.name,
        email: req.email,
        role,
        avatar_url: req.avatar_url,
        created_at: String::new(),
    };

    let created = state
        .db()
        .members()
        .create(&member)
        .await
        .map_err(|e| db_error(e, "Member"))?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/members/{id}",
    tag = "members",
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 200, description = "Member found", body = MemberResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_member<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<Json<MemberResponse>> {
    let member = state
        .db()
        .members()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &format!("Member '{}'", id)))?;

    Ok(Json(MemberResponse::from(member)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/members/{id}",
    tag = "members",
    params(("id" = String, Path, description = "Member ID")),
    request_body = PatchMemberRequest,
    responses(
        (status = 200, description = "Member updated", body = MemberResponse),
        (status = 400, description = "Invalid role", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_member<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    Json(req): Json<PatchMemberRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let label = format!("Member '{}'", id);
    let mut member = state
        .db()
        .members()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &label))?;

    req.merge_into(&mut member)?;

    state
        .db()
        .members()
        .update(&member)
        .await
        .map_err(|e| db_error(e, &label))?;

    Ok(Json(MemberResponse::from(member)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/members/{id}",
    tag = "members",
    params(("id" = String, Path, description = "Member ID")),
    responses(
        (status = 204, description = "Member removed"),
        (status = 404, description = "Member not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_member<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db()
        .members()
        .delete(&id)
        .await
        .map_err(|e| db_error(e, &format!("Member '{}'", id)))?;

    Ok(StatusCode::NO_CONTENT)
}
