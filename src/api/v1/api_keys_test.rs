//! Integration tests for API key endpoints.

use axum::http::StatusCode;
use serde_json::json;

use super::test_support::{expect_json, send, test_app};
use crate::api::auth::{API_KEY_PREFIX, hash_api_key};
use crate::test_support::FAMILY_ID;

#[tokio::test(flavor = "multi_thread")]
async fn created_key_is_shown_once_then_masked() {
    let app = test_app().await;
    let uri = format!("/api/v1/families/{}/api-keys", FAMILY_ID);

    let created = expect_json(
        &app,
        "POST",
        &uri,
        Some(json!({"name": "Assistant"})),
        StatusCode::CREATED,
    )
    .await;
    let plaintext = created["plaintext_key"].as_str().unwrap();
    assert!(plaintext.starts_with(API_KEY_PREFIX));
    assert_ne!(hash_api_key(plaintext), plaintext);
    assert_eq!(created["is_active"], true);
    assert!(created["key"].as_str().unwrap().ends_with("_****"));

    let keys = expect_json(&app, "GET", &uri, None, StatusCode::OK).await;
    assert_eq!(keys.as_array().unwrap().len(), 1);
    assert_eq!(keys[0]["name"], "Assistant");
    assert!(keys[0].get("plaintext_key").is_none());
    assert!(!keys[0].to_string().contains(plaintext));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_key_validation() {
    let app = test_app().await;

    let response = send(
        &app,
        "POST",
        &format!("/api/v1/families/{}/api-keys", FAMILY_ID),
        Some(json!({"name": " "})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        "POST",
        "/api/v1/families/nope0000/api-keys",
        Some(json!({"name": "Assistant"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn revoke_then_delete() {
    let app = test_app().await;
    let created = expect_json(
        &app,
        "POST",
        &format!("/api/v1/families/{}/api-keys", FAMILY_ID),
        Some(json!({"name": "Assistant"})),
        StatusCode::CREATED,
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let revoked = expect_json(
        &app,
        "POST",
        &format!("/api/v1/api-keys/{}/revoke", id),
        None,
        StatusCode::OK,
    )
    .await;
    assert_eq!(revoked["is_active"], false);

    let uri = format!("/api/v1/api-keys/{}", id);
    assert_eq!(
        send(&app, "DELETE", &uri, None).await.status(),
        StatusCode::NO_CONTENT
    );
    assert_eq!(
        send(&app, "DELETE", &uri, None).await.status(),
        StatusCode::NOT_FOUND
    );
}
