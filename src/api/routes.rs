//! API route configuration.

use axum::routing::{delete, get, patch, post, put};
use axum::{Router, middleware};
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::handlers::{self, HealthResponse};
use super::state::AppState;
use super::v1::{
    self, AddItemsRequest, AnnotatedScheduleResponse, ApiKeyResponse, CreateApiKeyRequest,
    CreateMemberRequest, CreateScheduleRequest, CreateSharedListRequest,
    CreateSubscriptionRequest, CreateTaskRequest, CreatedApiKeyResponse, ErrorResponse,
    EventOutcomeResponse, FamilyRequest, FamilyResponse, MemberResponse, PaginatedTasks,
    PatchMemberRequest, PatchScheduleRequest, PatchSharedListRequest, PatchTaskRequest,
    ScheduleListResponse, ScheduleResponse, SharedListItemResponse, SharedListResponse,
    SubscriptionResponse, SyncReportResponse, TaskResponse, TaskStatusRequest,
    ToggleItemRequest, UpdateItemRequest,
};
use super::auth;
use crate::db::Database;
use crate::mcp::create_mcp_service;
use crate::schedule::ScheduleView;

/// Build routes with generic database type.
///
/// Registers handlers that are generic over the Database trait, applying the
/// turbofish for each one.
macro_rules! routes {
    ($D:ty => {
        $($method:ident $path:literal => $($handler:ident)::+),* $(,)?
    }) => {{
        let router = Router::new();
        $(
            let router = router.route($path, $method($($handler)::+::<$D>));
        )*
        router
    }};
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Famille API",
        version = "0.3.0",
        description = "Family organizer: members, schedules with conflict warnings, calendar feeds, tasks and shared lists",
        license(name = "GPL-2.0")
    ),
    paths(
        handlers::root,
        handlers::health,
        v1::list_families,
        v1::get_family,
        v1::create_family,
        v1::update_family,
        v1::delete_family,
        v1::list_members,
        v1::create_member,
        v1::get_member,
        v1::patch_member,
        v1::delete_member,
        v1::list_schedules,
        v1::get_schedule,
        v1::create_schedule,
        v1::patch_schedule,
        v1::delete_schedule,
        v1::list_subscriptions,
        v1::get_subscription,
        v1::create_subscription,
        v1::delete_subscription,
        v1::sync_subscription,
        v1::list_tasks,
        v1::get_task,
        v1::create_task,
        v1::patch_task,
        v1::update_task_status,
        v1::delete_task,
        v1::list_shared_lists,
        v1::create_shared_list,
        v1::get_shared_list,
        v1::patch_shared_list,
        v1::delete_shared_list,
        v1::list_items,
        v1::add_items,
        v1::update_item,
        v1::toggle_item,
        v1::delete_item,
        v1::list_api_keys,
        v1::create_api_key,
        v1::revoke_api_key,
        v1::delete_api_key,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            FamilyResponse,
            FamilyRequest,
            MemberResponse,
            CreateMemberRequest,
            PatchMemberRequest,
            ScheduleView,
            ScheduleResponse,
            AnnotatedScheduleResponse,
            ScheduleListResponse,
            CreateScheduleRequest,
            PatchScheduleRequest,
            SubscriptionResponse,
            CreateSubscriptionRequest,
            EventOutcomeResponse,
            SyncReportResponse,
            TaskResponse,
            CreateTaskRequest,
            PatchTaskRequest,
            TaskStatusRequest,
            PaginatedTasks,
            SharedListResponse,
            SharedListItemResponse,
            CreateSharedListRequest,
            PatchSharedListRequest,
            AddItemsRequest,
            UpdateItemRequest,
            ToggleItemRequest,
            ApiKeyResponse,
            CreatedApiKeyResponse,
            CreateApiKeyRequest,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "families", description = "Families"),
        (name = "members", description = "Family members"),
        (name = "schedules", description = "Schedule entries with overlap and back-to-back warnings"),
        (name = "calendars", description = "External iCalendar subscriptions and sync"),
        (name = "tasks", description = "Family tasks"),
        (name = "shared-lists", description = "Shared checklists"),
        (name = "api-keys", description = "Keys for the /mcp endpoint")
    )
)]
pub struct ApiDoc;

/// Create the application router.
///
/// REST endpoints live under `/api/v1`, the MCP tool server under `/mcp`
/// behind the API key guard.
pub fn create_router<D: Database + 'static>(
    state: AppState<D>,
    cancellation_token: CancellationToken,
) -> Router {
    let api = ApiDoc::openapi();

    let family_routes = routes!(D => {
        get "/v1/families" => v1::list_families,
        post "/v1/families" => v1::create_family,
        get "/v1/families/{id}" => v1::get_family,
        put "/v1/families/{id}" => v1::update_family,
        delete "/v1/families/{id}" => v1::delete_family,
        get "/v1/families/{id}/members" => v1::list_members,
        post "/v1/families/{id}/members" => v1::create_member,
        get "/v1/members/{id}" => v1::get_member,
        patch "/v1/members/{id}" => v1::patch_member,
        delete "/v1/members/{id}" => v1::delete_member,
    });

    let schedule_routes = routes!(D => {
        get "/v1/families/{id}/schedules" => v1::list_schedules,
        post "/v1/schedules" => v1::create_schedule,
        get "/v1/schedules/{id}" => v1::get_schedule,
        patch "/v1/schedules/{id}" => v1::patch_schedule,
        delete "/v1/schedules/{id}" => v1::delete_schedule,
        get "/v1/families/{id}/calendar-subscriptions" => v1::list_subscriptions,
        post "/v1/calendar-subscriptions" => v1::create_subscription,
        get "/v1/calendar-subscriptions/{id}" => v1::get_subscription,
        delete "/v1/calendar-subscriptions/{id}" => v1::delete_subscription,
        post "/v1/calendar-subscriptions/{id}/sync" => v1::sync_subscription,
    });

    let task_routes = routes!(D => {
        get "/v1/families/{id}/tasks" => v1::list_tasks,
        post "/v1/families/{id}/tasks" => v1::create_task,
        get "/v1/tasks/{id}" => v1::get_task,
        patch "/v1/tasks/{id}" => v1::patch_task,
        delete "/v1/tasks/{id}" => v1::delete_task,
        put "/v1/tasks/{id}/status" => v1::update_task_status,
    });

    let shared_list_routes = routes!(D => {
        get "/v1/families/{id}/shared-lists" => v1::list_shared_lists,
        post "/v1/families/{id}/shared-lists" => v1::create_shared_list,
        get "/v1/shared-lists/{id}" => v1::get_shared_list,
        patch "/v1/shared-lists/{id}" => v1::patch_shared_list,
        delete "/v1/shared-lists/{id}" => v1::delete_shared_list,
        get "/v1/shared-lists/{id}/items" => v1::list_items,
        post "/v1/shared-lists/{id}/items" => v1::add_items,
        patch "/v1/shared-list-items/{id}" => v1::update_item,
        delete "/v1/shared-list-items/{id}" => v1::delete_item,
        post "/v1/shared-list-items/{id}/toggle" => v1::toggle_item,
    });

    let api_key_routes = routes!(D => {
        get "/v1/families/{id}/api-keys" => v1::list_api_keys,
        post "/v1/families/{id}/api-keys" => v1::create_api_key,
        post "/v1/api-keys/{id}/revoke" => v1::revoke_api_key,
        delete "/v1/api-keys/{id}" => v1::delete_api_key,
    });

    let api_routes = family_routes
        .merge(schedule_routes)
        .merge(task_routes)
        .merge(shared_list_routes)
        .merge(api_key_routes);

    let mcp_service = create_mcp_service(
        state.db_arc(),
        state.feed_arc(),
        *state.sync_config(),
        cancellation_token,
    );
    let mcp_routes = Router::new()
        .nest_service("/mcp", mcp_service)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key::<D>,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health::<D>))
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", api))
        .with_state(state)
        .merge(mcp_routes)
}
