//! MCP Streamable HTTP service creation

use std::sync::Arc;

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

use crate::calendar::{HttpFeedSource, SyncConfig};
use crate::db::Database;

use super::server::McpServer;

/// Create the MCP Streamable HTTP service, ready for `Router::nest_service`.
///
/// A fresh `McpServer` is built for every session; all of them share `db`
/// and `feed`.
pub fn create_mcp_service<D: Database + 'static>(
    db: Arc<D>,
    feed: Arc<HttpFeedSource>,
    sync: SyncConfig,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<McpServer<D>, LocalSessionManager> {
    // rmcp expects the factory to return io::Error
    let service_factory = move || -> Result<McpServer<D>, std::io::Error> {
        Ok(McpServer::new(Arc::clone(&db), Arc::clone(&feed), sync))
    };

    let mut config = StreamableHttpServerConfig::default();
    config.sse_keep_alive = None;
    config.sse_retry = None;
    config.stateful_mode = true;
    config.cancellation_token = cancellation_token;

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}
