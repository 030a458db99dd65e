//! Calendar subscription handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::api::AppState;
use crate::calendar::{
    EventOutcome, ReconcileError, ReconcileReport, is_supported_feed_url, reconcile,
};
use crate::db::{
    CalendarSubscription, Database, FamilyRepository, MemberRepository, SubscriptionRepository,
    UpsertOutcome,
};

use super::{ApiResult, ErrorResponse, db_error, error_response};

// =============================================================================
// DTOs
// =============================================================================

/// Calendar subscription response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    #[schema(example = "d4e5f6a7")]
    pub id: String,
    #[schema(example = "b2c3d4e5")]
    pub owner_id: String,
    #[schema(example = "https://calendar.example.com/lea.ics")]
    pub url: String,
    #[schema(example = "Activités de Léa")]
    pub display_name: String,
    #[schema(example = "#3b82f6")]
    pub color: String,
    pub last_synced_at: Option<String>,
    pub created_at: String,
}

impl From<CalendarSubscription> for SubscriptionResponse {
    fn from(s: CalendarSubscription) -> Self {
        Self {
            id: s.id,
            owner_id: s.owner_id,
            url: s.url,
            display_name: s.display_name,
            color: s.color,
            last_synced_at: s.last_synced_at,
            created_at: s.created_at,
        }
    }
}

/// Subscribe request DTO
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    #[schema(example = "b2c3d4e5")]
    pub owner_id: String,
    /// http, https or webcal URL of an iCalendar feed
    #[schema(example = "webcal://calendar.example.com/lea.ics")]
    pub url: String,
    #[schema(example = "Activités de Léa")]
    pub display_name: String,
    #[schema(example = "#3b82f6")]
    pub color: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListSubscriptionsQuery {
    /// Only this member's subscriptions
    #[param(example = "b2c3d4e5")]
    pub member_id: Option<String>,
}

/// Per-event result of a sync
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventOutcomeResponse {
    pub uid: Option<String>,
    /// inserted, updated, unchanged, skipped or failed
    #[schema(example = "inserted")]
    pub status: String,
    /// Skip reason or error message
    pub detail: Option<String>,
}

impl From<EventOutcome> for EventOutcomeResponse {
    fn from(o: EventOutcome) -> Self {
        match o {
            EventOutcome::Stored { uid, outcome } => Self {
                uid: Some(uid),
                status: match outcome {
                    UpsertOutcome::Inserted => "inserted",
                    UpsertOutcome::Updated => "updated",
                    UpsertOutcome::Unchanged => "unchanged",
                }
                .to_string(),
                detail: None,
            },
            EventOutcome::Skipped { uid, reason } => Self {
                uid,
                status: "skipped".to_string(),
                detail: Some(reason.to_string()),
            },
            EventOutcome::Failed { uid, error } => Self {
                uid: Some(uid),
                status: "failed".to_string(),
                detail: Some(error),
            },
        }
    }
}

/// Reconciliation report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SyncReportResponse {
    pub subscription_id: String,
    /// VEVENTs found in the feed
    pub total_in_feed: usize,
    /// Events stored (inserted + updated + unchanged)
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Entries removed because they left the feed
    pub deleted: u64,
    /// Set when removing stale entries failed
    pub sweep_error: Option<String>,
    pub synced_at: String,
    pub outcomes: Vec<EventOutcomeResponse>,
}

impl From<ReconcileReport> for SyncReportResponse {
    fn from(r: ReconcileReport) -> Self {
        Self {
            subscription_id: r.subscription_id,
            total_in_feed: r.total_in_feed,
            processed: r.processed,
            inserted: r.inserted,
            updated: r.updated,
            unchanged: r.unchanged,
            skipped: r.skipped,
            failed: r.failed,
            deleted: r.deleted,
            sweep_error: r.sweep_error,
            synced_at: r.synced_at,
            outcomes: r
                .outcomes
                .into_iter()
                .map(EventOutcomeResponse::from)
                .collect(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/families/{id}/calendar-subscriptions",
    tag = "calendars",
    params(
        ("id" = String, Path, description = "Family ID"),
        ListSubscriptionsQuery
    ),
    responses(
        (status = 200, description = "Subscriptions ordered by name", body = Vec<SubscriptionResponse>),
        (status = 404, description = "Family not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn list_subscriptions<D: Database>(
    State(state): State<AppState<D>>,
    Path(family_id): Path<String>,
    Query(query): Query<ListSubscriptionsQuery>,
) -> ApiResult<Json<Vec<SubscriptionResponse>>> {
    state
        .db()
        .families()
        .get(&family_id)
        .await
        .map_err(|e| db_error(e, &format!("Family '{}'", family_id)))?;

    let subscriptions = state.db().subscriptions();
    let result = match &query.member_id {
        Some(member_id) => subscriptions.list_by_owner(member_id).await,
        None => subscriptions.list_by_family(&family_id).await,
    }
    .map_err(|e| db_error(e, "Calendar subscriptions"))?;

    Ok(Json(
        result.into_iter().map(SubscriptionResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/calendar-subscriptions/{id}",
    tag = "calendars",
    params(("id" = String, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Subscription found", body = SubscriptionResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_subscription<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SubscriptionResponse>> {
    let subscription = state
        .db()
        .subscriptions()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &format!("Calendar subscription '{}'", id)))?;

    Ok(Json(SubscriptionResponse::from(subscription)))
}

#[utoipa::path(
    post,
    path = "/api/v1/calendar-subscriptions",
    tag = "calendars",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Unsupported URL or empty name", body = ErrorResponse),
        (status = 404, description = "Owner not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn create_subscription<D: Database>(
    State(state): State<AppState<D>>,
    Json(req): Json<CreateSubscriptionRequest>,
) -> ApiResult<(StatusCode, Json<SubscriptionResponse>)> {
    let url = req.url.trim();
    if !is_supported_feed_url(url) {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Unsupported calendar URL '{}': use http, https or webcal", url),
        ));
    }
    let display_name = req.display_name.trim();
    if display_name.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Display name must not be empty",
        ));
    }

    state
        .db()
        .members()
        .get(&req.owner_id)
        .await
        .map_err(|e| db_error(e, &format!("Member '{}'", req.owner_id)))?;

    let subscription = CalendarSubscription {
        id: String::new(),
        owner_id: req.owner_id,
        url: url.to_string(),
        display_name: display_name.to_string(),
        color: req.color.unwrap_or_default(),
        last_synced_at: None,
        created_at: String::new(),
    };

    let created = state
        .db()
        .subscriptions()
        .create(&subscription)
        .await
        .map_err(|e| db_error(e, "Calendar subscription"))?;

    Ok((StatusCode::CREATED, Json(SubscriptionResponse::from(created))))
}

/// Delete a subscription
///
/// Entries it produced stay in the schedule.
#[utoipa::path(
    delete,
    path = "/api/v1/calendar-subscriptions/{id}",
    tag = "calendars",
    params(("id" = String, Path, description = "Subscription ID")),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 404, description = "Subscription not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_subscription<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .db()
        .subscriptions()
        .delete(&id)
        .await
        .map_err(|e| db_error(e, &format!("Calendar subscription '{}'", id)))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Reconcile a subscription with its feed now
#[utoipa::path(
    post,
    path = "/api/v1/calendar-subscriptions/{id}/sync",
    tag = "calendars",
    params(("id" = String, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Feed reconciled", body = SyncReportResponse),
        (status = 404, description = "Subscription not found", body = ErrorResponse),
        (status = 502, description = "Feed unreachable or not iCalendar", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn sync_subscription<D: Database>(
    State(state): State<AppState<D>>,
    Path(id): Path<String>,
) -> ApiResult<Json<SyncReportResponse>> {
    let subscription = state
        .db()
        .subscriptions()
        .get(&id)
        .await
        .map_err(|e| db_error(e, &format!("Calendar subscription '{}'", id)))?;

    let report = reconcile(
        state.db(),
        state.feed(),
        &subscription,
        state.sync_config(),
    )
    .await
    .map_err(|e| match e {
        ReconcileError::Fetch(fetch) => {
            error_response(StatusCode::BAD_GATEWAY, fetch.to_string())
        }
        ReconcileError::Database(db) => db_error(db, "Calendar subscription"),
    })?;

    info!(
        subscription_id = %id,
        inserted = report.inserted,
        deleted = report.deleted,
        "Manual calendar sync"
    );

    Ok(Json(SyncReportResponse::from(report)))
}
