//! External calendar subscriptions.
//!
//! - `feed`: fetching iCalendar documents (`FeedSource`, `HttpFeedSource`)
//! - `ics`: extracting VEVENTs from a document
//! - `normalize`: turning a VEVENT into a schedule row
//! - `reconciler`: mirroring a feed into the schedule table
//! - `scheduler`: reconciling every subscription on an interval

mod feed;
mod ics;
mod normalize;
mod reconciler;
mod scheduler;

#[cfg(test)]
mod reconciler_test;

use std::time::Duration;

use chrono_tz::Tz;

#[cfg(test)]
pub use feed::MockFeedSource;
pub use feed::{FeedError, FeedSource, HttpFeedSource, is_supported_feed_url, resolve_feed_url};
pub use ics::{EventTime, FeedEvent, MalformedEvent, parse_feed};
pub use normalize::{LocalSlot, SkipReason, UNTITLED_EVENT, local_slot, to_schedule_entry};
pub use reconciler::{EventOutcome, ReconcileError, ReconcileReport, reconcile};
pub use scheduler::{MAX_CONCURRENT_SYNCS, SyncSummary, spawn_periodic_sync, sync_all};

/// Timezone used when none is configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Paris;

/// Default timeout for one feed download.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by every reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Zone UTC feed instants are converted into.
    pub timezone: Tz,
    pub fetch_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}
