//! Application state for the API server.

use std::sync::Arc;

use crate::calendar::{HttpFeedSource, SyncConfig};
use crate::db::Database;

/// Shared application state.
///
/// Generic over `D: Database` so handlers never name the storage backend.
/// The feed source is concrete: reconciliation futures started from
/// handlers and the periodic sweep must be `Send`.
pub struct AppState<D: Database> {
    db: Arc<D>,
    feed: Arc<HttpFeedSource>,
    sync: SyncConfig,
}

// Manual Clone impl - only the Arcs are cloned, D itself need not be Clone
impl<D: Database> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            feed: Arc::clone(&self.feed),
            sync: self.sync,
        }
    }
}

impl<D: Database> AppState<D> {
    pub fn new(db: D, feed: HttpFeedSource, sync: SyncConfig) -> Self {
        Self {
            db: Arc::new(db),
            feed: Arc::new(feed),
            sync,
        }
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &D {
        &self.db
    }

    /// Get a cloned Arc to the database.
    ///
    /// Useful for passing the database to services that need Arc<D>.
    pub fn db_arc(&self) -> Arc<D> {
        Arc::clone(&self.db)
    }

    pub fn feed(&self) -> &HttpFeedSource {
        &self.feed
    }

    pub fn feed_arc(&self) -> Arc<HttpFeedSource> {
        Arc::clone(&self.feed)
    }

    pub fn sync_config(&self) -> &SyncConfig {
        &self.sync
    }
}
