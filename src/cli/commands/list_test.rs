use crate::cli::api_client::ApiClient;
use crate::cli::commands::list::*;
use crate::db::{Database, SharedList, SharedListRepository};
use crate::test_support::{CHILD_ID, FAMILY_ID, seeded_db, spawn_api};

async fn spawn_test_server() -> (ApiClient, String, Vec<String>) {
    let db = seeded_db().await;
    let list = db
        .shared_lists()
        .create(&SharedList {
            id: "list0001".to_string(),
            family_id: FAMILY_ID.to_string(),
            name: "Courses".to_string(),
            description: None,
            color: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        })
        .await
        .unwrap();
    let items = db
        .shared_lists()
        .add_items(&list.id, &["Lait".to_string(), "Pain".to_string()])
        .await
        .unwrap();

    let client = ApiClient::new(Some(spawn_api(db).await));
    (client, list.id, items.into_iter().map(|i| i.id).collect())
}

#[test]
fn test_checklist_format() {
    let items = vec![
        ListItem {
            id: "item0001".to_string(),
            list_id: "list0001".to_string(),
            text: "Pain".to_string(),
            checked: false,
            checked_by: None,
        },
        ListItem {
            id: "item0002".to_string(),
            list_id: "list0001".to_string(),
            text: "Lait".to_string(),
            checked: true,
            checked_by: Some(CHILD_ID.to_string()),
        },
    ];

    assert_eq!(
        format_checklist(&items),
        "[ ] Pain  (item0001)\n[x] Lait  (item0002)"
    );
    assert_eq!(format_checklist(&[]), "The list is empty.");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_check_moves_item_down() {
    let (client, list_id, item_ids) = spawn_test_server().await;

    let output = check_item(&client, &item_ids[0], Some(CHILD_ID)).await.unwrap();
    assert_eq!(output, "✓ Checked: Lait");

    let listing = list_items(&client, &list_id, "table").await.unwrap();
    let lines: Vec<&str> = listing.lines().collect();
    assert!(lines[0].starts_with("[ ] Pain"));
    assert!(lines[1].starts_with("[x] Lait"));

    let output = check_item(&client, &item_ids[0], None).await.unwrap();
    assert_eq!(output, "○ Unchecked: Lait");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_items_json() {
    let (client, list_id, _) = spawn_test_server().await;

    let json = list_items(&client, &list_id, "json").await.unwrap();
    let items: Vec<ListItem> = serde_json::from_str(&json).unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| !i.checked));
}
