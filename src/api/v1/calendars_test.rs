//! Integration tests for calendar subscription endpoints.

use axum::http::StatusCode;
use serde_json::json;

use super::test_support::{expect_json, get, send, test_app};
use crate::test_support::{CHILD_ID, FAMILY_ID, PARENT_ID, TWO_EVENT_FEED, serve_ics};

async fn subscribe(app: &axum::Router, owner: &str, url: &str, name: &str) -> String {
    let created = expect_json(
        app,
        "POST",
        "/api/v1/calendar-subscriptions",
        Some(json!({"owner_id": owner, "url": url, "display_name": name})),
        StatusCode::CREATED,
    )
    .await;
    created["id"].as_str().unwrap().to_string()
}

#[tokio::test(flavor = "multi_thread")]
async fn subscribe_applies_default_color() {
    let app = test_app().await;

    let created = expect_json(
        &app,
        "POST",
        "/api/v1/calendar-subscriptions",
        Some(json!({
            "owner_id": CHILD_ID,
            "url": "webcal://calendar.example.com/lea.ics",
            "display_name": " Activités de Léa ",
        })),
        StatusCode::CREATED,
    )
    .await;

    assert_eq!(created["display_name"], "Activités de Léa");
    assert_eq!(created["url"], "webcal://calendar.example.com/lea.ics");
    assert_eq!(created["color"], "#3b82f6");
    assert!(created["last_synced_at"].is_null());
}

#[tokio::test(flavor = "multi_thread")]
async fn unsupported_urls_are_rejected() {
    let app = test_app().await;

    for url in ["ftp://example.com/a.ics", "calendar.ics", "https://"] {
        let response = send(
            &app,
            "POST",
            "/api/v1/calendar-subscriptions",
            Some(json!({"owner_id": CHILD_ID, "url": url, "display_name": "École"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{url}");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn list_by_family_and_member() {
    let app = test_app().await;
    subscribe(&app, CHILD_ID, "https://example.com/lea.ics", "Léa").await;
    subscribe(&app, PARENT_ID, "https://example.com/marie.ics", "Marie").await;

    let all = expect_json(
        &app,
        "GET",
        &format!("/api/v1/families/{}/calendar-subscriptions", FAMILY_ID),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let mine = expect_json(
        &app,
        "GET",
        &format!(
            "/api/v1/families/{}/calendar-subscriptions?member_id={}",
            FAMILY_ID, PARENT_ID
        ),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["display_name"], "Marie");
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_imports_feed_events() {
    let app = test_app().await;
    let url = serve_ics(TWO_EVENT_FEED.to_string()).await;
    let id = subscribe(&app, CHILD_ID, &url, "Activités").await;

    let report = expect_json(
        &app,
        "POST",
        &format!("/api/v1/calendar-subscriptions/{}/sync", id),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(report["subscription_id"], id.as_str());
    assert_eq!(report["total_in_feed"], 2);
    assert_eq!(report["inserted"], 2);
    assert_eq!(report["outcomes"].as_array().unwrap().len(), 2);

    let week = expect_json(
        &app,
        "GET",
        &format!(
            "/api/v1/families/{}/schedules?view=week&date=2025-03-10",
            FAMILY_ID
        ),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(week["total"], 2);
    assert!(
        week["items"]
            .as_array()
            .unwrap()
            .iter()
            .all(|i| i["read_only"] == true && i["owner_id"] == CHILD_ID)
    );

    // Second sync finds nothing new
    let again = expect_json(
        &app,
        "POST",
        &format!("/api/v1/calendar-subscriptions/{}/sync", id),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(again["inserted"], 0);
    assert_eq!(again["unchanged"], 2);

    let subscription = expect_json(
        &app,
        "GET",
        &format!("/api/v1/calendar-subscriptions/{}", id),
        None,
        StatusCode::OK,
    )
    .await;
    assert!(subscription["last_synced_at"].is_string());
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_of_unreachable_feed_is_bad_gateway() {
    let app = test_app().await;
    let id = subscribe(&app, CHILD_ID, "http://127.0.0.1:9/none.ics", "Hors ligne").await;

    let response = send(
        &app,
        "POST",
        &format!("/api/v1/calendar-subscriptions/{}/sync", id),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_subscription() {
    let app = test_app().await;
    let id = subscribe(&app, CHILD_ID, "https://example.com/lea.ics", "Léa").await;
    let uri = format!("/api/v1/calendar-subscriptions/{}", id);

    assert_eq!(
        send(&app, "DELETE", &uri, None).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(get(&app, &uri).await.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "POST", &format!("{}/sync", uri), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
