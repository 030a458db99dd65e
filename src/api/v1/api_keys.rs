//! MCP API key management.
//!
//! The plaintext key is only ever returned by `create_api_key`.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::api::AppState;
use crate::api::auth::generate_api_key;
use crate::db::{ApiKey, ApiKeyRepository, Database, FamilyRepository};

use super::{ApiResult, ErrorResponse, db_error, error_response};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiKeyResponse {
    pub id: String,
    pub family_id: String,
    #[schema(example = "Assistant de la maison")]
    pub name: String,
    pub description: Option<String>,
    /// Masked key, e.g. `fml_Ab3dE9xY_****`
    #[schema(example = "fml_Ab3dE9xY_****")]
    pub key: String,
    pub is_active: bool,
    pub last_used_at: Option<String>,
    pub expires_at: Option<String>,
    pub created_at: String,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(k: ApiKey) -> Self {
        Self {
            key: k.masked(),
            id: k.id,
            family_id: k.family_id,
            name: k.name,
            description: k.description,
            is_active: k.is_active,
            last_used_at: k.last_used_at,
            expires_at: k.expires_at,
            created_at: k.created_at,
        }
    }
}

/// Returned once, on creation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedApiKeyResponse {
    #[serde(flatten)]
    pub api_key: ApiKeyResponse,
    /// Full plaintext key; store it now, it cannot be shown again
    pub plaintext_key: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateApiKeyRequest {
    #[schema(example = "Assistant de la maison")]
    pub name: String,
    pub description: Option<String>,
    /// `YYYY-MM-DD HH:MM:SS` UTC; the key stops working at this instant
    #[schema(example = "2026-12-31 23:59:59")]
    pub expires_at: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/v1/families/{id}/api-keys",
    tag = "api-keys",
    params(("id" = String, Path, description = "Family ID")),
    responses(
        (status = 200, description = "Keys, newest first, masked", body = Vec<ApiKeyResponse>),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_api_keys<D: Database>(
    State(state): State<AppState<D>>,
    Path(family_id): Path<String>,
) -> ApiResult<Json<Vec<ApiKeyResponse>>> {
    state
        .db()
        .families()
        .get(&family_id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", family_id)))?;

    let keys = state
        .db()
        .api_keys()
        .list_by_family(&family_id)
        .await
        .map_err(|e| db_error(e, "API keys"))?;

    Ok(Json(keys.into_iter().map(ApiKeyResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/families/{id}/api-keys",
    tag = "api-keys",
    params(("id" = String, Path, description = "Family ID")),
    request_body = CreateApiKeyRequest,
    responses(
        (status = 201, description = "Key created", body = CreatedApiKeyResponse),
        (status = 400, description = "Empty name", body = ErrorResponse),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req))]
pub async fn create_api_key<D: Database>(
    State(state): State<AppState<D>>,
    Path(family_id): Path<String>,
    Json(req): Json<CreateApiKeyRequest>,
) -> ApiResult<(StatusCode, Json<CreatedApiKeyResponse>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Key name must not be empty",
        ));
    }

    state
        .db()
        .families()
        .get(&family_id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", family_id)))?;

    let generated = generate_api_key();
    let key = ApiKey {
        id: String::new(),
        family_id,
        key_prefix: generated.prefix,
        key_hash: generated.hash,
        name: name.to_string(),
        description: req.description,
        is_active: true,
        last_used_at: None,
        expires_at: req.expires_at,
        created_at: String::new(),
    };

    let created = state
        .db()
        .api_keys()
        .create(&key)
        .await
        .map_err(|e| db_error(e, "API key"))?;

    info!(key_id = %created.id, family_id = %created.family_id, "API key created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedApiKeyResponse {
            api_key: ApiKeyResponse::from(created),
            plaintext_key: generated.key,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/api-keys/{id}/revoke",
    tag = "api-keys",
    params(("id" = String, Path, description = "API key ID")),
    responses(
        (status = 200, description = "Key deactivated", body = ApiKeyResponse),
        (status = 404, description = "Key not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn revoke_api_key<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiKeyResponse>> {
    let key = state
        .db()
        .api_keys()
        .revoke(&id)
        .await
        .map_err(|e| db_error(e, &format!("API key '{}'", id)))?;

    info!(key_id = %id, "API key revoked");
    Ok(Json(ApiKeyResponse::from(key)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/api-keys/{id}",
    tag = "api-keys",
    params(("id" = String, Path, description = "API key ID")),
    responses(
        (status = 204, description = "Key deleted"),
        (status = 404, description = "Key not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_api_key<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db()
        .api_keys()
        .delete(&id)
        .await
        .map_err(|e| db_error(e, &format!("API key '{}'", id)))?;

    Ok(StatusCode::NO_CONTENT)
}
