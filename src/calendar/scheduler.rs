//! Periodic reconciliation of every subscription.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{StreamExt, stream};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::reconciler::reconcile;
use super::{FeedSource, HttpFeedSource, SyncConfig};
use crate::db::{Database, DbResult, SubscriptionRepository};

/// Feeds fetched at the same time during a sweep.
pub const MAX_CONCURRENT_SYNCS: usize = 4;

/// Outcome of one sweep over all subscriptions.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Reconcile every subscription once.
///
/// Failures of individual subscriptions are logged and counted; only a
/// failure to list subscriptions is returned.
pub async fn sync_all<D: Database, F: FeedSource>(
    db: &D,
    feed: &F,
    config: &SyncConfig,
) -> DbResult<SyncSummary> {
    let subscriptions = db.subscriptions().list().await?;

    let results: Vec<_> = stream::iter(subscriptions)
        .map(|subscription| async move {
            let result = reconcile(db, feed, &subscription, config).await;
            (subscription, result)
        })
        .buffer_unordered(MAX_CONCURRENT_SYNCS)
        .collect()
        .await;

    let mut summary = SyncSummary::default();
    for (subscription, result) in results {
        match result {
            Ok(_) => summary.succeeded += 1,
            Err(e) => {
                warn!(
                    subscription_id = %subscription.id,
                    url = %subscription.url,
                    error = %e,
                    "Calendar sync failed"
                );
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Run [`sync_all`] every `period` until `token` is cancelled.
///
/// The first sweep starts immediately.
pub fn spawn_periodic_sync<D: Database + 'static>(
    db: Arc<D>,
    feed: Arc<HttpFeedSource>,
    config: SyncConfig,
    period: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(period_secs = period.as_secs(), "Periodic calendar sync started");

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("Periodic calendar sync stopped");
                    break;
                }
                _ = interval.tick() => {
                    match sync_all(db.as_ref(), feed.as_ref(), &config).await {
                        Ok(summary) => info!(
                            succeeded = summary.succeeded,
                            failed = summary.failed,
                            "Calendar sweep finished"
                        ),
                        Err(e) => error!(error = %e, "Could not list calendar subscriptions"),
                    }
                }
            }
        }
    })
}
