//! Tests for SQLite database connection and migrations.

use crate::db::{
    Database, DbError, Family, FamilyMember, FamilyRepository, MemberRepository, MemberRole,
    SqliteDatabase,
};

#[tokio::test(flavor = "multi_thread")]
async fn migrate_creates_all_tables() {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(db.pool())
            .await
            .expect("Query should succeed");

    for table in [
        "_sqlx_migrations",
        "api_key",
        "calendar_subscription",
        "family",
        "family_member",
        "schedule",
        "shared_list",
        "shared_list_item",
        "task",
    ] {
        assert!(
            tables.iter().any(|t| t == table),
            "Missing table: {}. Found tables: {:?}",
            table,
            tables
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn migrate_is_idempotent() {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.expect("First migration should succeed");
    db.migrate().await.expect("Second migration should be a no-op");
}

#[tokio::test(flavor = "multi_thread")]
async fn foreign_keys_are_enforced() {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();

    let orphan = FamilyMember {
        id: String::new(),
        family_id: "missing0".to_string(),
        name: Some("Nobody".to_string()),
        email: None,
        role: MemberRole::Child,
        avatar_url: None,
        created_at: String::new(),
    };

    let result = db.members().create(&orphan).await;
    assert!(
        matches!(result, Err(DbError::Constraint { .. })),
        "expected constraint error, got {result:?}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("famille.db");

    {
        let db = SqliteDatabase::open(&path).await.unwrap();
        db.migrate().await.unwrap();
        db.families()
            .create(&Family {
                id: "fam00001".to_string(),
                name: "Martin".to_string(),
                created_at: String::new(),
            })
            .await
            .unwrap();
        db.pool().close().await;
    }

    let db = SqliteDatabase::open(&path).await.unwrap();
    db.migrate().await.unwrap();
    let family = db.families().get("fam00001").await.unwrap();
    assert_eq!(family.name, "Martin");
}
