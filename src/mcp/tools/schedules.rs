//! MCP tools for schedules.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult, schemars,
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{acting_member, invalid, json_result, map_db_error};
use crate::db::{Database, ScheduleEntry, ScheduleQuery, ScheduleRepository};
use crate::mcp::FamilyScope;
use crate::schedule::{
    ScheduleView, WallTime, annotate, ensure_deletable, validate_time_range, view_range,
};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListSchedulesParams {
    #[schemars(description = "Member asking; their family's schedule is listed")]
    pub member_id: String,
    #[schemars(description = "Date as YYYY-MM-DD (default: today)")]
    pub date: Option<String>,
    #[schemars(description = "'day' (default) or 'week' (Monday to Sunday around date)")]
    pub view: Option<String>,
    #[schemars(description = "Only the asking member's entries")]
    pub only_mine: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateScheduleParams {
    #[schemars(description = "Member the entry belongs to")]
    pub member_id: String,
    pub title: String,
    #[schemars(description = "Date as YYYY-MM-DD")]
    pub date: String,
    #[schemars(description = "Start as HH:MM (24h)")]
    pub start_time: String,
    #[schemars(description = "End as HH:MM (24h), after start_time")]
    pub end_time: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteScheduleParams {
    #[schemars(
        description = "Schedule entry ID. Entries synced from a calendar cannot be deleted."
    )]
    pub schedule_id: String,
}

pub struct ScheduleTools<D: Database> {
    db: Arc<D>,
    timezone: Tz,
}

impl<D: Database> Clone for ScheduleTools<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            timezone: self.timezone,
        }
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, McpError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| invalid("invalid_date", e))
}

fn parse_time(value: &str) -> Result<WallTime, McpError> {
    value
        .parse::<WallTime>()
        .map_err(|e| invalid("invalid_time", e))
}

impl<D: Database + 'static> ScheduleTools<D> {
    /// `timezone` decides what "today" is.
    pub fn new(db: Arc<D>, timezone: Tz) -> Self {
        Self { db, timezone }
    }

    pub async fn list_schedules(
        &self,
        scope: &FamilyScope,
        params: Parameters<ListSchedulesParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let member = acting_member(&*self.db, scope, &params.member_id).await?;

        let view = match params.view.as_deref() {
            Some(v) => v
                .parse::<ScheduleView>()
                .map_err(|e| invalid("invalid_view", e))?,
            None => ScheduleView::Day,
        };
        if view == ScheduleView::Member {
            return Err(invalid(
                "invalid_view",
                "Use only_mine with the day or week view",
            ));
        }
        let date = match params.date.as_deref() {
            Some(d) => parse_date(d)?,
            None => Utc::now().with_timezone(&self.timezone).date_naive(),
        };
        let (from, to) = view_range(view, date);

        let query = ScheduleQuery {
            family_id: Some(member.family_id),
            owner_id: params.only_mine.unwrap_or(false).then_some(member.id),
            from: Some(from),
            to,
            ..Default::default()
        };
        let result = self
            .db
            .schedules()
            .list(Some(&query))
            .await
            .map_err(map_db_error)?;

        let items = annotate(&result.items);
        json_result(&json!({
            "view": view,
            "from": from,
            "to": to,
            "total": items.len(),
            "items": items,
        }))
    }

    pub async fn create_schedule(
        &self,
        scope: &FamilyScope,
        params: Parameters<CreateScheduleParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        let title = params.title.trim();
        if title.is_empty() {
            return Err(invalid("invalid_title", "Title must not be empty"));
        }
        let date = parse_date(&params.date)?;
        let start_time = parse_time(&params.start_time)?;
        let end_time = parse_time(&params.end_time)?;
        validate_time_range(start_time, end_time).map_err(|e| invalid("invalid_time_range", e))?;

        acting_member(&*self.db, scope, &params.member_id).await?;

        let entry = ScheduleEntry {
            id: String::new(),
            owner_id: params.member_id,
            title: title.to_string(),
            description: params.description,
            location: params.location,
            date,
            start_time,
            end_time,
            external_source_id: None,
            external_uid: None,
            last_synced_at: None,
            created_at: String::new(),
        };

        let created = self
            .db
            .schedules()
            .create(&entry)
            .await
            .map_err(map_db_error)?;
        json_result(&created)
    }

    pub async fn delete_schedule(
        &self,
        scope: &FamilyScope,
        params: Parameters<DeleteScheduleParams>,
    ) -> Result<CallToolResult, McpError> {
        let id = &params.0.schedule_id;
        let entry = self.db.schedules().get(id).await.map_err(map_db_error)?;
        acting_member(&*self.db, scope, &entry.owner_id).await?;
        ensure_deletable(&entry).map_err(|e| invalid("read_only", e))?;

        self.db.schedules().delete(id).await.map_err(map_db_error)?;
        json_result(&json!({"deleted": id}))
    }
}
