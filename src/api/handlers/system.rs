//! Banner and health probe.

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::api::AppState;
use crate::db::{Database, FamilyRepository};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`
    #[schema(example = "ok")]
    pub status: String,
    /// Whether the database answered
    pub database: bool,
    #[schema(example = "0.3.0")]
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "system",
    responses(
        (status = 200, description = "Service name and version", body = String)
    )
)]
#[instrument]
pub async fn root() -> &'static str {
    concat!("famille ", env!("CARGO_PKG_VERSION"))
}

/// Report whether the server can reach its database
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health<D: Database>(
    State(state): State<AppState<D>>,
) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.db().families().list().await {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Health probe failed");
            false
        }
    };

    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if database { "ok" } else { "degraded" }.to_string(),
            database,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
