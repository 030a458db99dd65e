use crate::cli::api_client::ApiClient;
use crate::cli::commands::task::*;
use crate::cli::error::CliError;
use crate::db::{Database, Task as TaskModel, TaskRepository, TaskStatus};
use crate::test_support::{CHILD_ID, FAMILY_ID, seeded_db, spawn_api};

async fn spawn_test_server() -> ApiClient {
    let db = seeded_db().await;
    for (id, title, assigned) in [
        ("task0001", "Sortir la poubelle", Some(CHILD_ID)),
        ("task0002", "Payer la cantine", None),
    ] {
        db.tasks()
            .create(&TaskModel {
                id: id.to_string(),
                family_id: FAMILY_ID.to_string(),
                assigned_to: assigned.map(str::to_string),
                title: title.to_string(),
                description: None,
                status: TaskStatus::Pending,
                due_date: None,
                created_at: String::new(),
                completed_at: None,
            })
            .await
            .unwrap();
    }
    ApiClient::new(Some(spawn_api(db).await))
}

#[test]
fn test_status_request_serializes() {
    let json = serde_json::to_string(&TaskStatusRequest {
        status: "completed",
    })
    .unwrap();
    assert_eq!(json, r#"{"status":"completed"}"#);
}

#[test]
fn test_format_table_empty() {
    assert_eq!(format_table(&[]), "No tasks found.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_list_tasks_table() {
    let client = spawn_test_server().await;

    let output = list_tasks(&client, FAMILY_ID, None, "table").await.unwrap();
    assert!(output.contains("Sortir la poubelle"));
    assert!(output.contains("Payer la cantine"));
    assert!(output.contains(CHILD_ID));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_complete_then_filter() {
    let client = spawn_test_server().await;

    let output = complete_task(&client, "task0001").await.unwrap();
    assert_eq!(output, "✓ Task task0001 marked as complete");

    let json = list_tasks(&client, FAMILY_ID, Some("completed"), "json")
        .await
        .unwrap();
    let tasks: Vec<Task> = serde_json::from_str(&json).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "task0001");
    assert!(tasks[0].completed_at.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_complete_missing_task() {
    let client = spawn_test_server().await;

    let err = complete_task(&client, "nope0000").await.unwrap_err();
    match err {
        CliError::ApiError { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("nope0000"));
        }
        other => panic!("Expected ApiError, got {:?}", other),
    }
}
