//! HTTP API server.

mod events;
pub mod notifier;
mod routes;
mod state;
mod v1;


use std::net::IpAddr;

use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use routes::{ApiDoc, create_router};
pub use state::AppState;

use crate::execution::{LlmClient, ToolTransport};
use crate::store::ConfigStore;

/// API server configuration
pub struct Config {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".parse().unwrap(),
            port: 3900,
        }
    }
}

/// Initialize tracing subscriber with env filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mcphost=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run the API server with the given configuration until cancelled.
pub async fn run<S, T, L>(
    config: Config,
    state: AppState<S, T, L>,
    cancellation_token: CancellationToken,
) -> Result<(), Box<dyn std::error::Error>>
where
    S: ConfigStore + 'static,
    T: ToolTransport + 'static,
    L: LlmClient + 'static,
{
    init_tracing();

    let app = create_router(state, cancellation_token.clone()).layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancellation_token.cancelled().await })
        .await?;
    Ok(())
}
