//! Router and request helpers for the v1 endpoint tests.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use crate::api::{AppState, create_router};
use crate::calendar::SyncConfig;
use crate::db::SqliteDatabase;
use crate::test_support::{feed_source, seeded_db};

/// Router over a seeded in-memory database.
pub async fn test_app() -> Router {
    app_with(seeded_db().await)
}

pub fn app_with(db: SqliteDatabase) -> Router {
    let state = AppState::new(db, feed_source(), SyncConfig::default());
    create_router(state, CancellationToken::new())
}

pub async fn json_body(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response {
    send(app, "GET", uri, None).await
}

/// Send and assert the status, returning the JSON body.
pub async fn expect_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    status: StatusCode,
) -> Value {
    let response = send(app, method, uri, body).await;
    assert_eq!(response.status(), status, "{method} {uri}");
    json_body(response).await
}
