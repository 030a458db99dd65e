//! V1 API handlers.

mod api_keys;
mod calendars;
mod families;
mod members;
mod schedules;
mod shared_lists;
mod tasks;

#[cfg(test)]
mod api_keys_test;
#[cfg(test)]
mod calendars_test;
#[cfg(test)]
pub(crate) mod test_support;

pub use api_keys::*;
pub use calendars::*;
pub use families::*;
pub use members::*;
pub use schedules::*;
pub use shared_lists::*;
pub use tasks::*;

use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::DbError;

/// Error response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    #[schema(example = "Task 'a1b2c3d4' not found")]
    pub error: String,
}

/// Handler result with the JSON error body every endpoint uses.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ErrorResponse>)>;

pub(crate) fn error_response(
    status: StatusCode,
    error: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Map a storage error onto an HTTP status.
///
/// `NotFound` uses `label` (e.g. "Task 'a1b2c3d4'") for the message.
pub(crate) fn db_error(e: DbError, label: &str) -> (StatusCode, Json<ErrorResponse>) {
    match e {
        DbError::NotFound { .. } => {
            error_response(StatusCode::NOT_FOUND, format!("{} not found", label))
        }
        DbError::Validation { message } => error_response(StatusCode::BAD_REQUEST, message),
        DbError::Constraint { .. } | DbError::AlreadyExists { .. } => {
            error_response(StatusCode::CONFLICT, e.to_string())
        }
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Parse an optional `YYYY-MM-DD` query or body value.
pub(crate) fn parse_date(
    value: Option<&str>,
) -> Result<Option<chrono::NaiveDate>, (StatusCode, Json<ErrorResponse>)> {
    value
        .map(|v| {
            chrono::NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
                error_response(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid date '{}': expected YYYY-MM-DD", v),
                )
            })
        })
        .transpose()
}
