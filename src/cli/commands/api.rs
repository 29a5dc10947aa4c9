//! API server command - starts REST API + MCP.

use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use miette::{IntoDiagnostic, Result};
use tokio_util::sync::CancellationToken;

use crate::api::{self, AppState, Config};
use crate::api::notifier::ChangeNotifier;
use crate::execution::{HttpTransport, OpenAiClient};
use crate::store::{FileStore, StoreLayout};

/// Run the API server
pub async fn run(
    host: IpAddr,
    port: u16,
    project_dir: Option<PathBuf>,
    workspace_dir: Option<PathBuf>,
    user_dir: Option<PathBuf>,
) -> Result<()> {
    let mut layout = StoreLayout::discover();
    if let Some(dir) = project_dir {
        layout.project = dir;
    }
    if let Some(dir) = workspace_dir {
        layout.workspace = dir;
    }
    if let Some(dir) = user_dir {
        layout.user = dir;
    }

    // Print startup banner BEFORE the server initializes logging
    println!();
    println!("🚀 mcph API server starting...");
    println!("   API:  http://{}:{}/api/v1", host, port);
    println!("   MCP:  http://{}:{}/mcp", host, port);
    println!("   Docs: http://{}:{}/docs", host, port);
    println!();
    println!("   Project scope:   {}", layout.project.display());
    println!("   Workspace scope: {}", layout.workspace.display());
    println!("   User scope:      {}", layout.user.display());
    println!();

    let state = AppState::new(
        Arc::new(FileStore::new(layout)),
        Arc::new(HttpTransport::new()),
        Arc::new(OpenAiClient::new()),
        ChangeNotifier::new(),
    );

    let cancellation_token = CancellationToken::new();
    let ct = cancellation_token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ct.cancel();
        }
    });

    api::run(Config { host, port }, state, cancellation_token)
        .await
        .map_err(|e| miette::miette!("{e}"))?;

    Ok(())
}

/// Quick health probe against a running server
pub async fn health(api_client: &crate::cli::api_client::ApiClient) -> Result<String> {
    let response = api_client.get("/health").send().await.into_diagnostic()?;
    let status = response.status();
    let body: serde_json::Value = response.json().await.into_diagnostic()?;
    Ok(format!("{} ({})", body["status"].as_str().unwrap_or("?"), status))
}
