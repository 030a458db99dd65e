use crate::cli::api_client::ApiClient;
use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, conflict_badges, or_dash, truncate_with_ellipsis};
use serde::{Deserialize, Serialize};
use tabled::{Table, Tabled};

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleItem {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub location: Option<String>,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub read_only: bool,
    pub has_overlap: bool,
    pub has_back_to_back: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleListing {
    pub view: String,
    pub from: String,
    pub to: Option<String>,
    pub items: Vec<ScheduleItem>,
    pub total: usize,
}

#[derive(Tabled)]
pub(crate) struct ScheduleDisplay {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Member")]
    owner_id: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "")]
    badges: String,
}

impl From<&ScheduleItem> for ScheduleDisplay {
    fn from(item: &ScheduleItem) -> Self {
        let title = truncate_with_ellipsis(&item.title, 40);
        Self {
            date: item.date.clone(),
            time: format!("{}-{}", item.start_time, item.end_time),
            title: if item.read_only {
                format!("{} 🔗", title)
            } else {
                title
            },
            owner_id: item.owner_id.clone(),
            location: or_dash(item.location.as_deref()),
            badges: conflict_badges(item.has_overlap, item.has_back_to_back),
        }
    }
}

/// Show a family's day or week with conflict badges
pub async fn list_schedule(
    api_client: &ApiClient,
    family_id: &str,
    date: Option<&str>,
    view: &str,
    format: &str,
) -> CliResult<String> {
    let mut request = api_client
        .get(&format!("/api/v1/families/{}/schedules", family_id))
        .query(&[("view", view)]);
    if let Some(d) = date {
        request = request.query(&[("date", d)]);
    }

    let listing: ScheduleListing = ApiClient::handle_response(request.send().await?).await?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&listing)?),
        _ => Ok(format_table(&listing)),
    }
}

pub(crate) fn format_table(listing: &ScheduleListing) -> String {
    let range = match &listing.to {
        Some(to) if *to != listing.from => format!("{} → {}", listing.from, to),
        _ => listing.from.clone(),
    };
    if listing.items.is_empty() {
        return format!("Nothing scheduled ({}).", range);
    }

    let rows: Vec<ScheduleDisplay> = listing.items.iter().map(|i| i.into()).collect();
    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    format!("{} ({} entries)\n{}", range, listing.total, table)
}
