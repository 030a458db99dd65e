use crate::cli::api_client::ApiClient;
use crate::cli::commands::calendar::*;
use crate::cli::error::CliError;
use crate::db::{CalendarSubscription, Database, SqliteDatabase, SubscriptionRepository};
use crate::test_support::{CHILD_ID, FAMILY_ID, TWO_EVENT_FEED, seeded_db, serve_ics, spawn_api};

async fn subscribe(db: &SqliteDatabase, id: &str, url: &str) {
    db.subscriptions()
        .create(&CalendarSubscription {
            id: id.to_string(),
            owner_id: CHILD_ID.to_string(),
            url: url.to_string(),
            display_name: "Activités de Léa".to_string(),
            color: String::new(),
            last_synced_at: None,
            created_at: String::new(),
        })
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_subscriptions_table() {
    let db = seeded_db().await;
    subscribe(&db, "sub00001", "https://example.com/lea.ics").await;
    let client = ApiClient::new(Some(spawn_api(db).await));

    let output = list_subscriptions(&client, FAMILY_ID, "table").await.unwrap();
    assert!(output.contains("sub00001"));
    assert!(output.contains("Activités de Léa"));

    let json = list_subscriptions(&client, FAMILY_ID, "json").await.unwrap();
    let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_without_subscriptions() {
    let client = ApiClient::new(Some(spawn_api(seeded_db().await).await));

    let output = list_subscriptions(&client, FAMILY_ID, "table").await.unwrap();
    assert_eq!(output, "No calendar subscriptions.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_reports_counts() {
    let feed_url = serve_ics(TWO_EVENT_FEED.to_string()).await;
    let db = seeded_db().await;
    subscribe(&db, "sub00001", &feed_url).await;
    let client = ApiClient::new(Some(spawn_api(db).await));

    let output = sync_subscription(&client, "sub00001").await.unwrap();
    assert!(output.contains("2 events in feed"));
    assert!(output.contains("2 new"));
    assert!(!output.contains("skipped"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sync_unknown_subscription() {
    let client = ApiClient::new(Some(spawn_api(seeded_db().await).await));

    let err = sync_subscription(&client, "nope0000").await.unwrap_err();
    assert!(matches!(err, CliError::ApiError { status: 404, .. }));
}

#[test]
fn test_report_mentions_skips() {
    let report = SyncReport {
        subscription_id: "sub00001".to_string(),
        total_in_feed: 3,
        inserted: 1,
        updated: 0,
        unchanged: 0,
        skipped: 1,
        failed: 1,
        deleted: 0,
        sweep_error: None,
        synced_at: "2025-03-10 08:00:00".to_string(),
    };

    let output = format_report(&report);
    assert!(output.contains("1 skipped, 1 failed"));
    assert!(!output.contains("stale"));
}

#[test]
fn test_report_mentions_sweep_error() {
    let report = SyncReport {
        subscription_id: "sub00001".to_string(),
        total_in_feed: 2,
        inserted: 2,
        updated: 0,
        unchanged: 0,
        skipped: 0,
        failed: 0,
        deleted: 0,
        sweep_error: Some("database is locked".to_string()),
        synced_at: "2025-03-10 08:00:00".to_string(),
    };

    let output = format_report(&report);
    assert!(output.contains("stale entries not removed: database is locked"));
}
