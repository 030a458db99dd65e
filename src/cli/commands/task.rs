use crate::cli::api_client::ApiClient;
use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, or_dash, truncate_with_ellipsis};
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

#[derive(Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub family_id: String,
    pub assigned_to: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub due_date: Option<String>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TaskStatusRequest<'a> {
    pub(crate) status: &'a str,
}

#[derive(Tabled)]
pub(crate) struct TaskDisplay {
    #[tabled(rename = "ID")]
    pub(crate) id: String,
    #[tabled(rename = "Title")]
    pub(crate) title: String,
    #[tabled(rename = "Status")]
    pub(crate) status: String,
    #[tabled(rename = "Assigned")]
    pub(crate) assigned_to: String,
    #[tabled(rename = "Due")]
    pub(crate) due_date: String,
}

impl From<&Task> for TaskDisplay {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: truncate_with_ellipsis(&task.title, 50),
            status: task.status.clone(),
            assigned_to: or_dash(task.assigned_to.as_deref()),
            due_date: or_dash(task.due_date.as_deref()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TaskPage {
    items: Vec<Task>,
}

pub async fn list_tasks(
    api_client: &ApiClient,
    family_id: &str,
    status: Option<&str>,
    format: &str,
) -> CliResult<String> {
    let mut request = api_client.get(&format!("/api/v1/families/{}/tasks", family_id));
    if let Some(s) = status {
        request = request.query(&[("status", s)]);
    }

    let page: TaskPage = ApiClient::handle_response(request.send().await?).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&page.items)?),
        _ => Ok(format_table(&page.items)),
    }
}

pub(crate) fn format_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }

    let display_tasks: Vec<TaskDisplay> = tasks.iter().map(|t| t.into()).collect();
    let mut table = Table::new(display_tasks);
    apply_table_style(&mut table);
    table.to_string()
}

/// Mark a task as complete
pub async fn complete_task(api_client: &ApiClient, task_id: &str) -> CliResult<String> {
    let response = api_client
        .put(&format!("/api/v1/tasks/{}/status", task_id))
        .json(&TaskStatusRequest {
            status: "completed",
        })
        .send()
        .await?;

    let task: Task = ApiClient::handle_response(response).await?;
    Ok(format!("✓ Task {} marked as complete", task.id))
}
