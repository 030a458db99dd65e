//! Schedule handlers: annotated listings and manual entry management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;
use crate::db::{
    Database, FamilyRepository, MemberRepository, ScheduleEntry, ScheduleQuery,
    ScheduleRepository,
};
use crate::schedule::{
    AnnotatedEntry, ScheduleError, SchedulePatch, ScheduleView, WallTime, annotate,
    ensure_deletable, validate_time_range, view_range,
};

use super::{ApiResult, ErrorResponse, db_error, error_response, parse_date};

// =============================================================================
// DTOs
// =============================================================================

/// Schedule entry response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleResponse {
    #[schema(example = "c3d4e5f6")]
    pub id: String,
    #[schema(example = "b2c3d4e5")]
    pub owner_id: String,
    #[schema(example = "Cours de piano")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "Conservatoire")]
    pub location: Option<String>,
    #[schema(example = "2025-03-10")]
    pub date: String,
    #[schema(example = "17:00")]
    pub start_time: String,
    #[schema(example = "18:00")]
    pub end_time: String,
    /// Calendar subscription that produced this entry
    pub external_source_id: Option<String>,
    pub external_uid: Option<String>,
    pub last_synced_at: Option<String>,
    /// Synced entries accept location edits only
    pub read_only: bool,
    pub created_at: String,
}

impl From<ScheduleEntry> for ScheduleResponse {
    fn from(e: ScheduleEntry) -> Self {
        Self {
            read_only: e.is_external(),
            id: e.id,
            owner_id: e.owner_id,
            title: e.title,
            description: e.description,
            location: e.location,
            date: e.date.format("%Y-%m-%d").to_string(),
            start_time: e.start_time.to_string(),
            end_time: e.end_time.to_string(),
            external_source_id: e.external_source_id,
            external_uid: e.external_uid,
            last_synced_at: e.last_synced_at,
            created_at: e.created_at,
        }
    }
}

/// Schedule entry with conflict warnings
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnnotatedScheduleResponse {
    #[serde(flatten)]
    pub entry: ScheduleResponse,
    /// Intersects another entry on the same date (any member)
    pub has_overlap: bool,
    /// Same member has another entry within 30 minutes (never set with has_overlap)
    pub has_back_to_back: bool,
}

impl From<AnnotatedEntry> for AnnotatedScheduleResponse {
    fn from(a: AnnotatedEntry) -> Self {
        Self {
            entry: ScheduleResponse::from(a.entry),
            has_overlap: a.has_overlap,
            has_back_to_back: a.has_back_to_back,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSchedulesQuery {
    /// day (default), week (Monday to Sunday) or member (from date onwards)
    #[param(example = "week")]
    pub view: Option<String>,
    /// Anchor date, YYYY-MM-DD (default: today)
    #[param(example = "2025-03-10")]
    pub date: Option<String>,
    /// Only this member's entries (required for the member view)
    #[param(example = "b2c3d4e5")]
    pub member_id: Option<String>,
}

/// Annotated schedule listing
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScheduleListResponse {
    pub view: ScheduleView,
    #[schema(example = "2025-03-10")]
    pub from: String,
    /// Absent for the member view
    #[schema(example = "2025-03-16")]
    pub to: Option<String>,
    pub items: Vec<AnnotatedScheduleResponse>,
    pub total: usize,
}

/// Create manual entry request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateScheduleRequest {
    #[schema(example = "b2c3d4e5")]
    pub owner_id: String,
    #[schema(example = "Judo")]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "Dojo municipal")]
    pub location: Option<String>,
    #[schema(example = "2025-03-12")]
    pub date: String,
    #[schema(example = "17:00")]
    pub start_time: String,
    #[schema(example = "18:00")]
    pub end_time: String,
}

/// Patch entry request DTO
///
/// Synced entries accept `location` only.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchScheduleRequest {
    pub owner_id: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "crate::serde_utils::double_option")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    #[schema(example = "2025-03-12")]
    pub date: Option<String>,
    #[schema(example = "17:30")]
    pub start_time: Option<String>,
    #[schema(example = "18:30")]
    pub end_time: Option<String>,
}

impl PatchScheduleRequest {
    fn into_patch(self) -> ApiResult<SchedulePatch> {
        Ok(SchedulePatch {
            owner_id: self.owner_id,
            title: self.title.map(|t| t.trim().to_string()),
            description: self.description,
            location: self.location,
            date: parse_date(self.date.as_deref())?,
            start_time: self.start_time.as_deref().map(parse_time).transpose()?,
            end_time: self.end_time.as_deref().map(parse_time).transpose()?,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn schedule_error(e: ScheduleError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        ScheduleError::ReadOnly { .. } => StatusCode::CONFLICT,
        ScheduleError::InvalidTime { .. } | ScheduleError::InvalidTimeRange { .. } => {
            StatusCode::BAD_REQUEST
        }
    };
    error_response(status, e.to_string())
}

fn parse_time(value: &str) -> ApiResult<WallTime> {
    value.parse().map_err(schedule_error)
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

/// List a family's schedule with overlap and back-to-back flags
#[utoipa::path(
    get,
    path = "/api/v1/families/{id}/schedules",
    tag = "schedules",
    params(
        ("id" = String, Path, description = "Family ID"),
        ListSchedulesQuery
    ),
    responses(
        (status = 200, description = "Annotated entries ordered by date and start time", body = ScheduleListResponse),
        (status = 400, description = "Invalid view or date", body = ErrorResponse),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_schedules<D: Database>(
    State(state): State<AppState<D>>,
    Path(family_id): Path<String>,
    Query(query): Query<ListSchedulesQuery>,
) -> ApiResult<Json<ScheduleListResponse>> {
    let view: ScheduleView = match query.view.as_deref() {
        Some(v) => v
            .parse()
            .map_err(|e: String| error_response(StatusCode::BAD_REQUEST, e))?,
        None => ScheduleView::default(),
    };
    if view == ScheduleView::Member && query.member_id.is_none() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "The member view requires member_id",
        ));
    }

    let date = match parse_date(query.date.as_deref())? {
        Some(date) => date,
        None => today(&state),
    };
    let (from, to) = view_range(view, date);

    state
        .db()
        .families()
        .get(&family_id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", family_id)))?;

    let db_query = ScheduleQuery {
        family_id: Some(family_id),
        owner_id: query.member_id,
        from: Some(from),
        to,
        ..Default::default()
    };
    let result = state
        .db()
        .schedules()
        .list(Some(&db_query))
        .await
        .map_err(|e| db_error(e, "Schedules"))?;

    let items: Vec<AnnotatedScheduleResponse> = annotate(&result.items)
        .into_iter()
        .map(AnnotatedScheduleResponse::from)
        .collect();

    Ok(Json(ScheduleListResponse {
        view,
        from: from.format("%Y-%m-%d").to_string(),
        to: to.map(|d| d.format("%Y-%m-%d").to_string()),
        total: items.len(),
        items,
    }))
}

fn today<D: Database>(state: &AppState<D>) -> NaiveDate {
    Utc::now()
        .with_timezone(&state.sync_config().timezone)
        .date_naive()
}

#[utoipa::path(
    get,
    path = "/api/v1/schedules/{id}",
    tag = "schedules",
    params(("id" = String, Path, description = "Schedule entry ID")),
    responses(
        (status = 200, description = "Entry found", body = ScheduleResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_schedule<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ScheduleResponse>> {
    let entry = state
        .db()
        .schedules()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &format!("Schedule entry '{}'", id)))?;

    Ok(Json(ScheduleResponse::from(entry)))
}

#[utoipa::path(
    post,
    path = "/api/v1/schedules",
    tag = "schedules",
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, description = "Entry created", body = ScheduleResponse),
        (status = 400, description = "Invalid date, time or time range", body = ErrorResponse),
        (status = 404, description = "Owner not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_schedule<D: Database>(
    State(state): State<AppState<D>>,
    Json(req): Json<CreateScheduleRequest>,
) -> ApiResult<(StatusCode, Json<ScheduleResponse>)> {
    let title = required_title(&req.title)?;
    let date = parse_date(Some(&req.date))?.ok_or_else(|| {
        error_response(StatusCode::BAD_REQUEST, "A date is required")
    })?;
    let start_time = parse_time(&req.start_time)?;
    let end_time = parse_time(&req.end_time)?;
    validate_time_range(start_time, end_time).map_err(schedule_error)?;

    state
        .db()
        .members()
        .get(&req.owner_id)
        .await
        .map_err(|e| db_error(e, &format!("Member '{}'", req.owner_id)))?;

    let entry = ScheduleEntry {
        id: String::new(),
        owner_id: req.owner_id,
        title,
        description: req.description,
        location: req.location,
        date,
        start_time,
        end_time,
        external_source_id: None,
        external_uid: None,
        last_synced_at: None,
        created_at: String::new(),
    };

    let created = state
        .db()
        .schedules()
        .create(&entry)
        .await
        .map_err(|e| db_error(e, "Schedule entry"))?;

    Ok((StatusCode::CREATED, Json(ScheduleResponse::from(created))))
}

/// Partially update an entry
///
/// Synced entries accept only location changes; anything else is rejected
/// with 409.
#[utoipa::path(
    patch,
    path = "/api/v1/schedules/{id}",
    tag = "schedules",
    params(("id" = String, Path, description = "Schedule entry ID")),
    request_body = PatchScheduleRequest,
    responses(
        (status = 200, description = "Entry updated", body = ScheduleResponse),
        (status = 400, description = "Invalid date, time or time range", body = ErrorResponse),
        (status = 404, description = "Entry not found", body = ErrorResponse),
        (status = 409, description = "Entry is synced from a calendar", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn patch_schedule<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
    Json(req): Json<PatchScheduleRequest>,
) -> ApiResult<Json<ScheduleResponse>> {
    let label = format!("Schedule entry '{}'", id);
    let entry = state
        .db()
        .schedules()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &label))?;

    let mut patch = req.into_patch()?;
    if let Some(title) = &patch.title {
        patch.title = Some(required_title(title)?);
    }
    let updated = patch.apply(&entry).map_err(schedule_error)?;

    state
        .db()
        .schedules()
        .update(&updated)
        .await
        .map_err(|e| db_error(e, &label))?;

    Ok(Json(ScheduleResponse::from(updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/schedules/{id}",
    tag = "schedules",
    params(("id" = String, Path, description = "Schedule entry ID")),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 404, description = "Entry not found", body = ErrorResponse),
        (status = 409, description = "Entry is synced from a calendar", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_schedule<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let label = format!("Schedule entry '{}'", id);
    let entry = state
        .db()
        .schedules()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &label))?;

    ensure_deletable(&entry).map_err(schedule_error)?;

    state
        .db()
        .schedules()
        .delete(&id)
        .await
        .map_err(|e| db_error(e, &label))?;

    Ok(StatusCode::NO_CONTENT)
}
