//! MCP Streamable HTTP service creation.
//!
//! Produces a `StreamableHttpService` that nests into the Axum router at
//! `/mcp`, with one `McpServer` instance per session.

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

use crate::api::AppState;
use crate::execution::{LlmClient, ToolTransport};
use crate::store::ConfigStore;

use super::server::McpServer;

/// Create the MCP Streamable HTTP service over the shared application state.
pub fn create_mcp_service<S, T, L>(
    state: AppState<S, T, L>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<McpServer<S, T, L>, LocalSessionManager>
where
    S: ConfigStore + 'static,
    T: ToolTransport + 'static,
    L: LlmClient + 'static,
{
    // Service factory: creates a new McpServer instance per session.
    // Returns io::Error to match rmcp's expected signature.
    let service_factory = move || -> Result<McpServer<S, T, L>, std::io::Error> {
        Ok(McpServer::new(state.clone()))
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
