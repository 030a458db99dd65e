use crate::cli::api_client::ApiClient;
use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, or_dash, truncate_with_ellipsis};
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

#[derive(Debug, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub owner_id: String,
    pub url: String,
    pub display_name: String,
    pub color: String,
    pub last_synced_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncReport {
    pub subscription_id: String,
    pub total_in_feed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub deleted: u64,
    #[serde(default)]
    pub sweep_error: Option<String>,
    pub synced_at: String,
}

#[derive(Tabled)]
pub(crate) struct SubscriptionDisplay {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Member")]
    owner_id: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Last sync")]
    last_synced_at: String,
}

impl From<&Subscription> for SubscriptionDisplay {
    fn from(s: &Subscription) -> Self {
        Self {
            id: s.id.clone(),
            name: s.display_name.clone(),
            owner_id: s.owner_id.clone(),
            url: truncate_with_ellipsis(&s.url, 50),
            last_synced_at: or_dash(s.last_synced_at.as_deref()),
        }
    }
}

pub async fn list_subscriptions(
    api_client: &ApiClient,
    family_id: &str,
    format: &str,
) -> CliResult<String> {
    let response = api_client
        .get(&format!(
            "/api/v1/families/{}/calendar-subscriptions",
            family_id
        ))
        .send()
        .await?;
    let subscriptions: Vec<Subscription> = ApiClient::handle_response(response).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&subscriptions)?),
        _ => {
            if subscriptions.is_empty() {
                return Ok("No calendar subscriptions.".to_string());
            }
            let rows: Vec<SubscriptionDisplay> = subscriptions.iter().map(|s| s.into()).collect();
            let mut table = Table::new(rows);
            apply_table_style(&mut table);
            Ok(table.to_string())
        }
    }
}

/// Reconcile a subscription with its feed now
pub async fn sync_subscription(api_client: &ApiClient, id: &str) -> CliResult<String> {
    let response = api_client
        .post(&format!("/api/v1/calendar-subscriptions/{}/sync", id))
        .send()
        .await?;
    let report: SyncReport = ApiClient::handle_response(response).await?;

    Ok(format_report(&report))
}

pub(crate) fn format_report(report: &SyncReport) -> String {
    let mut out = format!(
        "✓ Synced {}: {} events in feed, {} new, {} updated, {} unchanged, {} removed",
        report.subscription_id,
        report.total_in_feed,
        report.inserted,
        report.updated,
        report.unchanged,
        report.deleted
    );
    if report.skipped > 0 || report.failed > 0 {
        out.push_str(&format!(
            "\n  {} skipped, {} failed",
            report.skipped, report.failed
        ));
    }
    if let Some(error) = &report.sweep_error {
        out.push_str(&format!("\n  ⚠ stale entries not removed: {}", error));
    }
    out
}
