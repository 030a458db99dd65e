//! HTTP server: REST API, OpenAPI docs and the MCP endpoint.

pub mod auth;
mod handlers;
mod routes;
mod state;
pub mod v1;


use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::calendar::{FeedError, HttpFeedSource, SyncConfig, spawn_periodic_sync};
use crate::db::Database;

pub use routes::{ApiDoc, create_router};
pub use state::AppState;

/// API server errors
#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Failed to bind to {addr}: {source}")]
    #[diagnostic(code(famille::api::bind))]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    #[diagnostic(code(famille::api::serve))]
    Serve(std::io::Error),

    #[error("Failed to build feed client: {0}")]
    #[diagnostic(code(famille::api::feed))]
    Feed(#[from] FeedError),
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Timezone and fetch timeout used for calendar reconciliation
    pub sync: SyncConfig,
    /// Reconcile every subscription at this interval; `None` disables it
    pub sync_interval: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3737,
            sync: SyncConfig::default(),
            sync_interval: None,
        }
    }
}

/// Initialize tracing subscriber with env filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "famille=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run the API server until Ctrl-C.
pub async fn run<D: Database + 'static>(config: Config, db: D) -> Result<(), ApiError> {
    init_tracing();

    let feed = HttpFeedSource::new(config.sync.fetch_timeout)?;
    let state = AppState::new(db, feed, config.sync);
    let ct = CancellationToken::new();

    let sweeper = config.sync_interval.map(|period| {
        info!(?period, "Periodic calendar sync enabled");
        spawn_periodic_sync(
            state.db_arc(),
            state.feed_arc(),
            config.sync,
            period,
            ct.child_token(),
        )
    });

    let app = create_router(state, ct.child_token()).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ApiError::Bind { addr, source })?;
    info!("API server listening on http://{}", addr);
    info!("API docs at http://{}/docs", addr);

    let shutdown = ct.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutting down");
            shutdown.cancel();
        })
        .await
        .map_err(ApiError::Serve)?;

    if let Some(handle) = sweeper {
        ct.cancel();
        let _ = handle.await;
    }

    Ok(())
}
