//! Tests for calendar reconciliation against an in-memory database.

use chrono::NaiveDate;

use super::feed::MockFeedSource;
use super::normalize::SkipReason;
use super::reconciler::{EventOutcome, ReconcileError, reconcile};
use super::{FeedError, SyncConfig};
use crate::db::{
    CalendarSubscription, Database, Family, FamilyMember, FamilyRepository, MemberRepository,
    MemberRole, ScheduleEntry, ScheduleQuery, ScheduleRepository, SqliteDatabase,
    SubscriptionRepository,
};

const PIANO: &str = "BEGIN:VEVENT\r\n\
UID:piano@example.com\r\n\
SUMMARY:Cours de piano\r\n\
DTSTART:20250310T170000\r\n\
DTEND:20250310T180000\r\n\
END:VEVENT\r\n";

const FOOT: &str = "BEGIN:VEVENT\r\n\
UID:foot@example.com\r\n\
SUMMARY:Entraînement\r\n\
LOCATION:Stade\r\n\
DTSTART:20250312T140000\r\n\
DTEND:20250312T153000\r\n\
END:VEVENT\r\n";

const DENTIST: &str = "BEGIN:VEVENT\r\n\
UID:dentist@example.com\r\n\
SUMMARY:Dentiste\r\n\
DTSTART:20250313T090000\r\n\
DTEND:20250313T090000\r\n\
END:VEVENT\r\n";

fn calendar(events: &[&str]) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\n{}END:VCALENDAR\r\n",
        events.concat()
    )
}

fn serving(content: String) -> MockFeedSource {
    let mut feed = MockFeedSource::new();
    feed.expect_fetch()
        .returning(move |_| Ok(content.clone()));
    feed
}

async fn setup_db() -> (SqliteDatabase, CalendarSubscription) {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();

    db.families()
        .create(&Family {
            id: "fam00001".to_string(),
            name: "Dupont".to_string(),
            created_at: String::new(),
        })
        .await
        .unwrap();
    db.members()
        .create(&FamilyMember {
            id: "mem00001".to_string(),
            family_id: "fam00001".to_string(),
            name: Some("Léa".to_string()),
            email: None,
            role: MemberRole::Child,
            avatar_url: None,
            created_at: String::new(),
        })
        .await
        .unwrap();

    let subscription = db
        .subscriptions()
        .create(&CalendarSubscription {
            id: "sub00001".to_string(),
            owner_id: "mem00001".to_string(),
            url: "https://calendar.example.com/lea.ics".to_string(),
            display_name: "Activités".to_string(),
            color: "#10b981".to_string(),
            last_synced_at: None,
            created_at: String::new(),
        })
        .await
        .unwrap();

    (db, subscription)
}

async fn synced_entries(db: &SqliteDatabase, source: &str) -> Vec<ScheduleEntry> {
    db.schedules()
        .list(Some(&ScheduleQuery {
            external_source_id: Some(source.to_string()),
            ..Default::default()
        }))
        .await
        .unwrap()
        .items
}

#[tokio::test(flavor = "multi_thread")]
async fn first_run_inserts_every_event() {
    let (db, sub) = setup_db().await;
    let feed = serving(calendar(&[PIANO, FOOT, DENTIST]));

    let report = reconcile(&db, &feed, &sub, &SyncConfig::default())
        .await
        .unwrap();

    assert_eq!(report.total_in_feed, 3);
    assert_eq!(report.processed, 3);
    assert_eq!(report.inserted, 3);
    assert_eq!(report.deleted, 0);

    let entries = synced_entries(&db, "sub00001").await;
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, vec!["Cours de piano", "Entraînement", "Dentiste"]);
    assert!(entries.iter().all(|e| e.owner_id == "mem00001"));
    assert_eq!(entries[1].location.as_deref(), Some("Stade"));

    let stored = db.subscriptions().get("sub00001").await.unwrap();
    assert_eq!(stored.last_synced_at, Some(report.synced_at));
}

#[tokio::test(flavor = "multi_thread")]
async fn equal_start_and_end_are_stored_one_hour_apart() {
    let (db, sub) = setup_db().await;
    let feed = serving(calendar(&[DENTIST]));

    reconcile(&db, &feed, &sub, &SyncConfig::default())
        .await
        .unwrap();

    let entries = synced_entries(&db, "sub00001").await;
    assert_eq!(entries[0].date, NaiveDate::from_ymd_opt(2025, 3, 13).unwrap());
    assert_eq!(entries[0].start_time.to_string(), "09:00");
    assert_eq!(entries[0].end_time.to_string(), "10:00");
}

#[tokio::test(flavor = "multi_thread")]
async fn second_run_on_same_feed_changes_nothing() {
    let (db, sub) = setup_db().await;
    let content = calendar(&[PIANO, FOOT, DENTIST]);

    reconcile(&db, &serving(content.clone()), &sub, &SyncConfig::default())
        .await
        .unwrap();
    let before = synced_entries(&db, "sub00001").await;

    let report = reconcile(&db, &serving(content), &sub, &SyncConfig::default())
        .await
        .unwrap();
    let after = synced_entries(&db, "sub00001").await;

    assert_eq!(report.inserted, 0);
    assert_eq!(report.updated, 0);
    assert_eq!(report.unchanged, 3);
    assert_eq!(report.deleted, 0);
    assert_eq!(before, after);
}

#[tokio::test(flavor = "multi_thread")]
async fn changed_event_is_updated_in_place() {
    let (db, sub) = setup_db().await;
    reconcile(&db, &serving(calendar(&[PIANO])), &sub, &SyncConfig::default())
        .await
        .unwrap();
    let original = synced_entries(&db, "sub00001").await.remove(0);

    let moved = PIANO.replace("SUMMARY:Cours de piano", "SUMMARY:Piano (salle 2)");
    let report = reconcile(&db, &serving(calendar(&[moved.as_str()])), &sub, &SyncConfig::default())
        .await
        .unwrap();

    assert_eq!(report.updated, 1);
    let entries = synced_entries(&db, "sub00001").await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, original.id);
    assert_eq!(entries[0].title, "Piano (salle 2)");
}

#[tokio::test(flavor = "multi_thread")]
async fn events_removed_from_feed_are_deleted() {
    let (db, sub) = setup_db().await;
    reconcile(
        &db,
        &serving(calendar(&[PIANO, FOOT, DENTIST])),
        &sub,
        &SyncConfig::default(),
    )
    .await
    .unwrap();

    let report = reconcile(&db, &serving(calendar(&[FOOT])), &sub, &SyncConfig::default())
        .await
        .unwrap();

    assert_eq!(report.deleted, 2);
    let uids: Vec<Option<String>> = synced_entries(&db, "sub00001")
        .await
        .into_iter()
        .map(|e| e.external_uid)
        .collect();
    assert_eq!(uids, vec![Some("foot@example.com".to_string())]);
}

#[tokio::test(flavor = "multi_thread")]
async fn stale_sweep_leaves_manual_entries_alone() {
    let (db, sub) = setup_db().await;
    let manual = db
        .schedules()
        .create(&ScheduleEntry {
            id: String::new(),
            owner_id: "mem00001".to_string(),
            title: "Anniversaire".to_string(),
            description: None,
            location: None,
            date: NaiveDate::from_ymd_opt(2025, 3, 12).unwrap(),
            start_time: "16:00".parse().unwrap(),
            end_time: "18:00".parse().unwrap(),
            external_source_id: None,
            external_uid: None,
            last_synced_at: None,
            created_at: String::new(),
        })
        .await
        .unwrap();

    reconcile(&db, &serving(calendar(&[PIANO, FOOT])), &sub, &SyncConfig::default())
        .await
        .unwrap();
    reconcile(&db, &serving(calendar(&[FOOT])), &sub, &SyncConfig::default())
        .await
        .unwrap();

    assert_eq!(db.schedules().get(&manual.id).await.unwrap(), manual);
}

#[tokio::test(flavor = "multi_thread")]
async fn feed_without_valid_events_deletes_nothing() {
    let (db, sub) = setup_db().await;
    reconcile(&db, &serving(calendar(&[PIANO, FOOT])), &sub, &SyncConfig::default())
        .await
        .unwrap();

    let report = reconcile(&db, &serving(calendar(&[])), &sub, &SyncConfig::default())
        .await
        .unwrap();

    assert_eq!(report.total_in_feed, 0);
    assert_eq!(report.deleted, 0);
    assert_eq!(synced_entries(&db, "sub00001").await.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_events_are_skipped_and_counted() {
    let (db, sub) = setup_db().await;
    let no_start = "BEGIN:VEVENT\r\nUID:nostart@example.com\r\nSUMMARY:Sans date\r\nEND:VEVENT\r\n";
    let no_uid = "BEGIN:VEVENT\r\nSUMMARY:Anonyme\r\nDTSTART:20250310T100000\r\nEND:VEVENT\r\n";
    let duplicate = PIANO.replace("SUMMARY:Cours de piano", "SUMMARY:Doublon");

    let report = reconcile(
        &db,
        &serving(calendar(&[PIANO, no_start, no_uid, duplicate.as_str()])),
        &sub,
        &SyncConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.total_in_feed, 4);
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.failed, 0);

    let reasons: Vec<SkipReason> = report
        .outcomes
        .iter()
        .filter_map(|o| match o {
            EventOutcome::Skipped { reason, .. } => Some(*reason),
            _ => None,
        })
        .collect();
    assert_eq!(
        reasons,
        vec![
            SkipReason::MissingStart,
            SkipReason::MissingUid,
            SkipReason::DuplicateUid
        ]
    );

    // First occurrence of a UID wins.
    let entries = synced_entries(&db, "sub00001").await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Cours de piano");
}

#[tokio::test(flavor = "multi_thread")]
async fn untitled_event_gets_placeholder() {
    let (db, sub) = setup_db().await;
    let untitled = "BEGIN:VEVENT\r\nUID:untitled@example.com\r\nDTSTART:20250310T100000\r\nEND:VEVENT\r\n";

    reconcile(&db, &serving(calendar(&[untitled])), &sub, &SyncConfig::default())
        .await
        .unwrap();

    let entries = synced_entries(&db, "sub00001").await;
    assert_eq!(entries[0].title, "(Sans titre)");
    assert_eq!(entries[0].end_time.to_string(), "11:00");
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_failure_changes_nothing() {
    let (db, sub) = setup_db().await;
    let mut feed = MockFeedSource::new();
    feed.expect_fetch().returning(|url| {
        Err(FeedError::Status {
            url: url.to_string(),
            status: 404,
        })
    });

    let result = reconcile(&db, &feed, &sub, &SyncConfig::default()).await;

    assert!(matches!(
        result,
        Err(ReconcileError::Fetch(FeedError::Status { status: 404, .. }))
    ));
    assert!(synced_entries(&db, "sub00001").await.is_empty());
    let stored = db.subscriptions().get("sub00001").await.unwrap();
    assert_eq!(stored.last_synced_at, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn unparseable_feed_changes_nothing() {
    let (db, sub) = setup_db().await;
    reconcile(&db, &serving(calendar(&[PIANO])), &sub, &SyncConfig::default())
        .await
        .unwrap();
    let synced_before = db.subscriptions().get("sub00001").await.unwrap().last_synced_at;

    let result = reconcile(
        &db,
        &serving("<html>maintenance</html>".to_string()),
        &sub,
        &SyncConfig::default(),
    )
    .await;

    assert!(matches!(
        result,
        Err(ReconcileError::Fetch(FeedError::Parse { .. }))
    ));
    assert_eq!(synced_entries(&db, "sub00001").await.len(), 1);
    assert_eq!(
        db.subscriptions().get("sub00001").await.unwrap().last_synced_at,
        synced_before
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_event_is_skipped_and_the_rest_stored() {
    let (db, sub) = setup_db().await;
    let broken = "BEGIN:VEVENT\r\n\
UID:broken@example.com\r\n\
THIS LINE HAS NO COLON\r\n\
DTSTART:20250311T170000\r\n\
END:VEVENT\r\n";

    let report = reconcile(
        &db,
        &serving(calendar(&[PIANO, broken, FOOT])),
        &sub,
        &SyncConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.total_in_feed, 3);
    assert_eq!(report.processed, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        report.outcomes[1],
        EventOutcome::Skipped {
            uid: Some("broken@example.com".to_string()),
            reason: SkipReason::Malformed,
        }
    );

    let entries = synced_entries(&db, "sub00001").await;
    let uids: Vec<&str> = entries
        .iter()
        .filter_map(|e| e.external_uid.as_deref())
        .collect();
    assert_eq!(uids, vec!["piano@example.com", "foot@example.com"]);
}

/// Reset the subscription's sync stamp so a later run visibly moves it.
async fn backdate_sync(db: &SqliteDatabase) {
    db.subscriptions()
        .mark_synced("sub00001", "2000-01-01 00:00:00")
        .await
        .unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_upsert_keeps_previous_row_and_run_continues() {
    let (db, sub) = setup_db().await;
    reconcile(
        &db,
        &serving(calendar(&[PIANO, FOOT, DENTIST])),
        &sub,
        &SyncConfig::default(),
    )
    .await
    .unwrap();
    backdate_sync(&db).await;

    sqlx::query(
        r#"
        CREATE TRIGGER reject_foot BEFORE UPDATE ON schedule
        WHEN NEW.external_uid = 'foot@example.com'
        BEGIN
            SELECT RAISE(ABORT, 'foot is locked');
        END
        "#,
    )
    .execute(db.pool())
    .await
    .unwrap();

    let moved_foot = FOOT.replace("LOCATION:Stade", "LOCATION:Gymnase");
    let renamed_piano = PIANO.replace("Cours de piano", "Piano (salle 2)");
    let report = reconcile(
        &db,
        &serving(calendar(&[renamed_piano.as_str(), moved_foot.as_str()])),
        &sub,
        &SyncConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.failed, 1);
    assert_eq!(report.updated, 1);
    assert_eq!(report.deleted, 1);
    assert!(matches!(
        &report.outcomes[1],
        EventOutcome::Failed { uid, .. } if uid == "foot@example.com"
    ));

    let entries = synced_entries(&db, "sub00001").await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title, "Piano (salle 2)");
    assert_eq!(entries[1].external_uid.as_deref(), Some("foot@example.com"));
    assert_eq!(entries[1].location.as_deref(), Some("Stade"));

    let stored = db.subscriptions().get("sub00001").await.unwrap();
    assert_eq!(stored.last_synced_at, Some(report.synced_at));
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_stale_sweep_still_marks_synced() {
    let (db, sub) = setup_db().await;
    reconcile(&db, &serving(calendar(&[PIANO, FOOT])), &sub, &SyncConfig::default())
        .await
        .unwrap();
    backdate_sync(&db).await;

    sqlx::query(
        r#"
        CREATE TRIGGER keep_schedule BEFORE DELETE ON schedule
        BEGIN
            SELECT RAISE(ABORT, 'deletes disabled');
        END
        "#,
    )
    .execute(db.pool())
    .await
    .unwrap();

    let report = reconcile(&db, &serving(calendar(&[PIANO])), &sub, &SyncConfig::default())
        .await
        .unwrap();

    assert_eq!(report.deleted, 0);
    assert!(report.sweep_error.is_some());
    assert_eq!(synced_entries(&db, "sub00001").await.len(), 2);

    let stored = db.subscriptions().get("sub00001").await.unwrap();
    assert_eq!(stored.last_synced_at, Some(report.synced_at));
}
