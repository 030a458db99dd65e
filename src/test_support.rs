//! Fixtures shared by the API, MCP and CLI tests.

use std::time::Duration;

use crate::calendar::HttpFeedSource;
use crate::db::{
    Database, Family, FamilyMember, FamilyRepository, MemberRepository, MemberRole,
    SqliteDatabase,
};

pub const FAMILY_ID: &str = "fam00001";
pub const PARENT_ID: &str = "mem00001";
pub const CHILD_ID: &str = "mem00002";

/// Migrated in-memory database with one family, a parent and a child.
pub async fn seeded_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");

    db.families()
        .create(&Family {
            id: FAMILY_ID.to_string(),
            name: "Dupont".to_string(),
            created_at: String::new(),
        })
        .await
        .expect("Create family");

    for (id, name, role) in [
        (PARENT_ID, "Marie", MemberRole::Parent),
        (CHILD_ID, "Léa", MemberRole::Child),
    ] {
        db.members()
            .create(&FamilyMember {
                id: id.to_string(),
                family_id: FAMILY_ID.to_string(),
                name: Some(name.to_string()),
                email: None,
                role,
                avatar_url: None,
                created_at: String::new(),
            })
            .await
            .expect("Create member");
    }

    db
}

pub const OTHER_FAMILY_ID: &str = "fam00002";
pub const OTHER_MEMBER_ID: &str = "mem00099";

/// Add a second family with a single member.
pub async fn add_other_family(db: &SqliteDatabase) {
    db.families()
        .create(&Family {
            id: OTHER_FAMILY_ID.to_string(),
            name: "Martin".to_string(),
            created_at: String::new(),
        })
        .await
        .expect("Create other family");
    db.members()
        .create(&FamilyMember {
            id: OTHER_MEMBER_ID.to_string(),
            family_id: OTHER_FAMILY_ID.to_string(),
            name: Some("Paul".to_string()),
            email: None,
            role: MemberRole::Parent,
            avatar_url: None,
            created_at: String::new(),
        })
        .await
        .expect("Create other member");
}

/// Scope of an API key issued to the seeded family.
pub fn family_scope() -> crate::mcp::FamilyScope {
    crate::mcp::FamilyScope::new(FAMILY_ID)
}

/// Request parts as the API key guard leaves them for `family_id`.
pub fn scoped_parts(family_id: &str) -> axum::http::request::Parts {
    let (mut parts, ()) = axum::http::Request::new(()).into_parts();
    parts
        .extensions
        .insert(crate::mcp::FamilyScope::new(family_id));
    parts
}

/// HTTP feed client with a short timeout.
pub fn feed_source() -> HttpFeedSource {
    let _ = rustls::crypto::ring::default_provider().install_default();
    HttpFeedSource::new(Duration::from_secs(5)).expect("Build feed client")
}

/// Serve `body` as `text/calendar` on a random local port; returns the URL.
pub async fn serve_ics(body: String) -> String {
    use axum::{Router, http::header, routing::get};

    let app = Router::new().route(
        "/family.ics",
        get(move || {
            let body = body.clone();
            async move { ([(header::CONTENT_TYPE, "text/calendar")], body) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Bind feed server");
    let addr = listener.local_addr().expect("Local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}/family.ics", addr)
}

/// Run the full router over `db` on a random local port; returns the base URL.
pub async fn spawn_api(db: SqliteDatabase) -> String {
    use tokio_util::sync::CancellationToken;

    use crate::api::{AppState, create_router};
    use crate::calendar::SyncConfig;

    let state = AppState::new(db, feed_source(), SyncConfig::default());
    let app = create_router(state, CancellationToken::new());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Bind API server");
    let addr = listener.local_addr().expect("Local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{}", addr)
}

/// Two-event calendar used by sync tests.
pub const TWO_EVENT_FEED: &str = "BEGIN:VCALENDAR\r
VERSION:2.0\r
PRODID:-//famille//test//FR\r
BEGIN:VEVENT\r
UID:piano@example.com\r
DTSTART:20250310T170000\r
DTEND:20250310T180000\r
SUMMARY:Piano\r
END:VEVENT\r
BEGIN:VEVENT\r
UID:foot@example.com\r
DTSTART:20250312T140000\r
DTEND:20250312T153000\r
SUMMARY:Football\r
LOCATION:Stade\r
END:VEVENT\r
END:VCALENDAR\r
";

/// Parse the JSON text of a successful MCP tool call.
pub fn tool_json(result: &rmcp::model::CallToolResult) -> serde_json::Value {
    match &result.content[0].raw {
        rmcp::model::RawContent::Text(text) => {
            serde_json::from_str(&text.text).expect("Tool output should be JSON")
        }
        other => panic!("Expected text content, got {:?}", other),
    }
}
