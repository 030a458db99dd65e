use chrono::NaiveDate;

use crate::cli::api_client::ApiClient;
use crate::cli::commands::schedule::*;
use crate::cli::error::CliError;
use crate::db::{Database, ScheduleEntry, ScheduleRepository, SqliteDatabase};
use crate::schedule::WallTime;
use crate::test_support::{CHILD_ID, FAMILY_ID, PARENT_ID, seeded_db, spawn_api};

async fn add_entry(
    db: &SqliteDatabase,
    owner: &str,
    title: &str,
    day: u32,
    start: (u32, u32),
    end: (u32, u32),
) {
    db.schedules()
        .create(&ScheduleEntry {
            id: String::new(),
            owner_id: owner.to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            date: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
            start_time: WallTime::new(start.0, start.1).unwrap(),
            end_time: WallTime::new(end.0, end.1).unwrap(),
            external_source_id: None,
            external_uid: None,
            last_synced_at: None,
            created_at: String::new(),
        })
        .await
        .unwrap();
}

async fn spawn_test_server() -> ApiClient {
    let db = seeded_db().await;
    add_entry(&db, CHILD_ID, "Piano", 10, (17, 0), (18, 0)).await;
    add_entry(&db, PARENT_ID, "Réunion", 10, (17, 30), (18, 30)).await;
    add_entry(&db, CHILD_ID, "Judo", 12, (18, 0), (19, 0)).await;
    add_entry(&db, CHILD_ID, "Natation", 12, (19, 15), (20, 0)).await;
    ApiClient::new(Some(spawn_api(db).await))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_day_table_shows_overlap_badges() {
    let client = spawn_test_server().await;

    let output = list_schedule(&client, FAMILY_ID, Some("2025-03-10"), "day", "table")
        .await
        .unwrap();

    assert!(output.starts_with("2025-03-10 (2 entries)"));
    assert!(output.contains("Piano"));
    assert!(output.contains("17:00-18:00"));
    assert!(output.contains("⚠ overlap"));
    assert!(!output.contains("Judo"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_week_json_contains_flags() {
    let client = spawn_test_server().await;

    let output = list_schedule(&client, FAMILY_ID, Some("2025-03-12"), "week", "json")
        .await
        .unwrap();
    let listing: serde_json::Value = serde_json::from_str(&output).unwrap();

    assert_eq!(listing["from"], "2025-03-10");
    assert_eq!(listing["to"], "2025-03-16");
    assert_eq!(listing["total"], 4);
    let judo = listing["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["title"] == "Judo")
        .unwrap();
    assert_eq!(judo["has_back_to_back"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_empty_day() {
    let client = spawn_test_server().await;

    let output = list_schedule(&client, FAMILY_ID, Some("2025-03-11"), "day", "table")
        .await
        .unwrap();
    assert_eq!(output, "Nothing scheduled (2025-03-11).");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_view_is_api_error() {
    let client = spawn_test_server().await;

    let err = list_schedule(&client, FAMILY_ID, None, "month", "table")
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::ApiError { status: 400, .. }));
}
