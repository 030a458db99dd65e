use crate::cli::api_client::ApiClient;
use crate::cli::error::CliResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ListItem {
    pub id: String,
    pub list_id: String,
    pub text: String,
    pub checked: bool,
    pub checked_by: Option<String>,
}

#[derive(Debug, Serialize)]
struct ToggleRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    checked_by: Option<&'a str>,
}

/// Print a checklist, unchecked items first
pub async fn list_items(api_client: &ApiClient, list_id: &str, format: &str) -> CliResult<String> {
    let response = api_client
        .get(&format!("/api/v1/shared-lists/{}/items", list_id))
        .send()
        .await?;
    let items: Vec<ListItem> = ApiClient::handle_response(response).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&items)?),
        _ => Ok(format_checklist(&items)),
    }
}

pub(crate) fn format_checklist(items: &[ListItem]) -> String {
    if items.is_empty() {
        return "The list is empty.".to_string();
    }

    items
        .iter()
        .map(|item| {
            let mark = if item.checked { "x" } else { " " };
            format!("[{}] {}  ({})", mark, item.text, item.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Flip an item between checked and unchecked
pub async fn check_item(
    api_client: &ApiClient,
    item_id: &str,
    member_id: Option<&str>,
) -> CliResult<String> {
    let response = api_client
        .post(&format!("/api/v1/shared-list-items/{}/toggle", item_id))
        .json(&ToggleRequest {
            checked_by: member_id,
        })
        .send()
        .await?;
    let item: ListItem = ApiClient::handle_response(response).await?;

    if item.checked {
        Ok(format!("✓ Checked: {}", item.text))
    } else {
        Ok(format!("○ Unchecked: {}", item.text))
    }
}
