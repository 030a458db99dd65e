//! Tests for MCP server initialization and tool delegation

use std::sync::Arc;

use rmcp::ServerHandler;
use rmcp::handler::server::{tool::Extension, wrapper::Parameters};

use super::server::McpServer;
use super::tools::{
    CreateTaskParams, DeleteTaskParams, ListSchedulesParams, ListSharedListsParams,
    ListTasksParams,
};
use crate::calendar::SyncConfig;
use crate::db::{Database, Task, TaskRepository, TaskStatus};
use crate::test_support::{
    CHILD_ID, FAMILY_ID, OTHER_FAMILY_ID, OTHER_MEMBER_ID, PARENT_ID, add_other_family,
    feed_source, scoped_parts, seeded_db, tool_json,
};

async fn server() -> McpServer<crate::db::SqliteDatabase> {
    let db = seeded_db().await;
    McpServer::new(Arc::new(db), Arc::new(feed_source()), SyncConfig::default())
}

#[tokio::test(flavor = "multi_thread")]
async fn server_info_advertises_tools() {
    let server = server().await;

    let info = server.get_info();

    assert!(
        info.capabilities.tools.is_some(),
        "Server should support tools"
    );
    assert!(
        info.instructions
            .as_deref()
            .is_some_and(|i| i.contains("member_id")),
        "Instructions should explain member_id"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn tasks_created_through_server_are_listed() {
    let server = server().await;

    server
        .create_task(Extension(scoped_parts(FAMILY_ID)), Parameters(CreateTaskParams {
            member_id: PARENT_ID.to_string(),
            title: "Ranger la chambre".to_string(),
            description: None,
            assigned_to: Some(CHILD_ID.to_string()),
            due_date: Some("2025-03-14".to_string()),
        }))
        .await
        .expect("create_task should succeed");

    let listed = server
        .list_tasks(Extension(scoped_parts(FAMILY_ID)), Parameters(ListTasksParams {
            member_id: CHILD_ID.to_string(),
            status: None,
            only_mine: Some(true),
            limit: None,
        }))
        .await
        .expect("list_tasks should succeed");

    let json = tool_json(&listed);
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["title"], "Ranger la chambre");
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_member_is_rejected() {
    let server = server().await;

    let result = server
        .list_schedules(Extension(scoped_parts(FAMILY_ID)), Parameters(ListSchedulesParams {
            member_id: "nobody00".to_string(),
            date: None,
            view: None,
            only_mine: None,
        }))
        .await;

    assert!(result.is_err(), "Unknown member should fail");
}

#[tokio::test(flavor = "multi_thread")]
async fn key_of_one_family_cannot_touch_another() {
    let db = Arc::new(seeded_db().await);
    add_other_family(&db).await;
    let foreign_task = db
        .tasks()
        .create(&Task {
            id: String::new(),
            family_id: OTHER_FAMILY_ID.to_string(),
            assigned_to: None,
            title: "Payer la cantine".to_string(),
            description: None,
            status: TaskStatus::Pending,
            due_date: None,
            created_at: String::new(),
            completed_at: None,
        })
        .await
        .unwrap();
    let server = McpServer::new(Arc::clone(&db), Arc::new(feed_source()), SyncConfig::default());

    let listed = server
        .list_tasks(
            Extension(scoped_parts(FAMILY_ID)),
            Parameters(ListTasksParams {
                member_id: OTHER_MEMBER_ID.to_string(),
                status: None,
                only_mine: None,
                limit: None,
            }),
        )
        .await;
    assert!(listed.is_err(), "Another family's member must be refused");

    let deleted = server
        .delete_task(
            Extension(scoped_parts(FAMILY_ID)),
            Parameters(DeleteTaskParams {
                task_id: foreign_task.id.clone(),
            }),
        )
        .await;
    assert!(deleted.is_err(), "Another family's task must be refused");
    assert!(db.tasks().get(&foreign_task.id).await.is_ok());

    // The owning family's key still works.
    server
        .delete_task(
            Extension(scoped_parts(OTHER_FAMILY_ID)),
            Parameters(DeleteTaskParams {
                task_id: foreign_task.id.clone(),
            }),
        )
        .await
        .expect("owning family may delete its task");
}

#[tokio::test(flavor = "multi_thread")]
async fn request_without_key_scope_is_refused() {
    let server = server().await;
    let (parts, ()) = axum::http::Request::new(()).into_parts();

    let result = server
        .list_shared_lists(
            Extension(parts),
            Parameters(ListSharedListsParams {
                member_id: PARENT_ID.to_string(),
            }),
        )
        .await;

    assert!(result.is_err());
}
