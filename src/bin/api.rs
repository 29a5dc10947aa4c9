//! MCP host API server binary.
//!
//! Builds the concrete store, transport, and LLM client and passes them to
//! the API layer, which stays agnostic of the implementations.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use miette::Result;

#[derive(Parser)]
#[command(name = "mcph-api")]
#[command(author, version, about = "MCP host API server", long_about = None)]
struct Cli {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "3900")]
    port: u16,

    /// Project scope directory (default: ./.mcphost/project)
    #[arg(long)]
    project_dir: Option<PathBuf>,

    /// Workspace scope directory (default: ./.mcphost/workspace)
    #[arg(long)]
    workspace_dir: Option<PathBuf>,

    /// User scope directory (default: XDG config dir)
    #[arg(long)]
    user_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    mcphost::cli::run_server(
        cli.host,
        cli.port,
        cli.project_dir,
        cli.workspace_dir,
        cli.user_dir,
    )
    .await
}
