//! Mirroring a subscription's feed into the schedule table.

use std::collections::HashSet;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::normalize::{SkipReason, to_schedule_entry};
use super::{FeedError, FeedSource, SyncConfig, parse_feed};
use crate::db::utils::current_timestamp;
use crate::db::{
    CalendarSubscription, Database, DbError, ScheduleRepository, SubscriptionRepository,
    UpsertOutcome,
};

/// Errors that abort a reconciliation run.
#[derive(Error, Diagnostic, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Fetch(#[from] FeedError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),
}

/// What happened to one VEVENT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventOutcome {
    Stored {
        uid: String,
        outcome: UpsertOutcome,
    },
    Skipped {
        uid: Option<String>,
        reason: SkipReason,
    },
    Failed {
        uid: String,
        error: String,
    },
}

/// Summary of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub subscription_id: String,
    /// VEVENTs found in the feed.
    pub total_in_feed: usize,
    /// Events stored (inserted, updated or already up to date).
    pub processed: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Stale entries removed after the upserts.
    pub deleted: u64,
    /// Why removing stale entries failed, if it did.
    pub sweep_error: Option<String>,
    pub synced_at: String,
    pub outcomes: Vec<EventOutcome>,
}

impl ReconcileReport {
    fn new(subscription_id: &str, synced_at: String, outcomes: Vec<EventOutcome>) -> Self {
        let mut report = Self {
            subscription_id: subscription_id.to_string(),
            total_in_feed: outcomes.len(),
            processed: 0,
            inserted: 0,
            updated: 0,
            unchanged: 0,
            skipped: 0,
            failed: 0,
            deleted: 0,
            sweep_error: None,
            synced_at,
            outcomes: Vec::new(),
        };

        for outcome in &outcomes {
            match outcome {
                EventOutcome::Stored { outcome, .. } => {
                    report.processed += 1;
                    match outcome {
                        UpsertOutcome::Inserted => report.inserted += 1,
                        UpsertOutcome::Updated => report.updated += 1,
                        UpsertOutcome::Unchanged => report.unchanged += 1,
                    }
                }
                EventOutcome::Skipped { .. } => report.skipped += 1,
                EventOutcome::Failed { .. } => report.failed += 1,
            }
        }
        report.outcomes = outcomes;
        report
    }
}

/// Make the subscription's stored entries mirror its feed.
///
/// A fetch failure, or a document that is not a calendar, returns early
/// without touching any row. After a successful fetch, every event with a
/// start and UID is upserted, then entries whose UID left the feed are
/// deleted, unless the feed produced no valid UID at all. Malformed events,
/// per-event failures and a failed stale sweep are reported, never
/// propagated, and the subscription is always marked synced.
#[instrument(skip(db, feed, subscription, config), fields(subscription_id = %subscription.id))]
pub async fn reconcile<D: Database, F: FeedSource>(
    db: &D,
    feed: &F,
    subscription: &CalendarSubscription,
    config: &SyncConfig,
) -> Result<ReconcileReport, ReconcileError> {
    let content = feed.fetch(&subscription.url).await?;
    let events = parse_feed(&content)?;
    let synced_at = current_timestamp();

    debug!(events = events.len(), "Parsed feed");

    let schedules = db.schedules();
    let mut valid_uids: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut outcomes = Vec::with_capacity(events.len());

    for parsed in events {
        let event = match parsed {
            Ok(event) => event,
            Err(malformed) => {
                warn!(uid = ?malformed.uid, error = %malformed.message, "Skipping malformed event");
                outcomes.push(EventOutcome::Skipped {
                    uid: malformed.uid,
                    reason: SkipReason::Malformed,
                });
                continue;
            }
        };

        let entry = match to_schedule_entry(&event, subscription, config.timezone, &synced_at) {
            Ok(entry) => entry,
            Err(reason) => {
                debug!(uid = ?event.uid, %reason, "Skipping event");
                outcomes.push(EventOutcome::Skipped {
                    uid: event.uid.clone(),
                    reason,
                });
                continue;
            }
        };

        // to_schedule_entry guarantees the UID.
        let uid = entry.external_uid.clone().unwrap_or_default();
        if !seen.insert(uid.clone()) {
            outcomes.push(EventOutcome::Skipped {
                uid: Some(uid),
                reason: SkipReason::DuplicateUid,
            });
            continue;
        }

        // A failed upsert still counts as present in the feed, so its
        // previous row survives the stale sweep.
        valid_uids.push(uid.clone());

        match schedules.upsert_external(&entry).await {
            Ok(outcome) => outcomes.push(EventOutcome::Stored { uid, outcome }),
            Err(e) => {
                warn!(uid = %uid, error = %e, "Failed to store feed event");
                outcomes.push(EventOutcome::Failed {
                    uid,
                    error: e.to_string(),
                });
            }
        }
    }

    let mut report = ReconcileReport::new(&subscription.id, synced_at, outcomes);

    if valid_uids.is_empty() {
        warn!("Feed produced no valid events; keeping existing entries");
    } else {
        match schedules
            .delete_external_except(&subscription.id, &valid_uids)
            .await
        {
            Ok(deleted) => report.deleted = deleted,
            Err(e) => {
                warn!(error = %e, "Failed to remove stale entries");
                report.sweep_error = Some(e.to_string());
            }
        }
    }

    db.subscriptions()
        .mark_synced(&subscription.id, &report.synced_at)
        .await?;

    info!(
        processed = report.processed,
        inserted = report.inserted,
        updated = report.updated,
        skipped = report.skipped,
        failed = report.failed,
        deleted = report.deleted,
        "Calendar reconciled"
    );

    Ok(report)
}
