//! MCP tools for calendar subscriptions.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult, schemars,
    schemars::JsonSchema,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{acting_member, json_result, map_db_error};
use crate::calendar::{HttpFeedSource, ReconcileError, SyncConfig, reconcile};
use crate::db::{Database, SubscriptionRepository};
use crate::mcp::FamilyScope;

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListCalendarSubscriptionsParams {
    #[schemars(description = "Member asking; their family's subscriptions are listed")]
    pub member_id: String,
    #[schemars(description = "Only the asking member's subscriptions")]
    pub only_mine: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SyncCalendarSubscriptionParams {
    #[schemars(description = "Calendar subscription ID")]
    pub subscription_id: String,
}

pub struct CalendarTools<D: Database> {
    db: Arc<D>,
    feed: Arc<HttpFeedSource>,
    config: SyncConfig,
}

impl<D: Database> Clone for CalendarTools<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            feed: Arc::clone(&self.feed),
            config: self.config,
        }
    }
}

impl<D: Database + 'static> CalendarTools<D> {
    pub fn new(db: Arc<D>, feed: Arc<HttpFeedSource>, config: SyncConfig) -> Self {
        Self { db, feed, config }
    }

    pub async fn list_calendar_subscriptions(
        &self,
        scope: &FamilyScope,
        params: Parameters<ListCalendarSubscriptionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let member = acting_member(&*self.db, scope, &params.0.member_id).await?;
        let subscriptions = self.db.subscriptions();
        let result = if params.0.only_mine.unwrap_or(false) {
            subscriptions.list_by_owner(&member.id).await
        } else {
            subscriptions.list_by_family(&member.family_id).await
        }
        .map_err(map_db_error)?;

        json_result(&result)
    }

    pub async fn sync_calendar_subscription(
        &self,
        scope: &FamilyScope,
        params: Parameters<SyncCalendarSubscriptionParams>,
    ) -> Result<CallToolResult, McpError> {
        let subscription = self
            .db
            .subscriptions()
            .get(&params.0.subscription_id)
            .await
            .map_err(map_db_error)?;
        acting_member(&*self.db, scope, &subscription.owner_id).await?;

        let report = reconcile(&*self.db, &*self.feed, &subscription, &self.config)
            .await
            .map_err(|e| match e {
                ReconcileError::Fetch(fetch) => McpError::internal_error(
                    "feed_unavailable",
                    Some(json!({"error": fetch.to_string(), "url": subscription.url})),
                ),
                ReconcileError::Database(db) => map_db_error(db),
            })?;

        json_result(&report)
    }
}
