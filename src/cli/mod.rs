pub mod api_client;
mod commands;
pub mod error;
mod utils;

pub use commands::api::run as run_server;


use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mcph")]
#[command(author, version, about = "MCP host configuration and execution CLI", long_about = None)]
pub struct Cli {
    /// Override the API URL (default: MCPH_API_URL env or http://localhost:3900)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Component configuration commands
    Component {
        #[command(subcommand)]
        command: ComponentCommands,
    },
    /// Agent commands
    Agent {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Tool commands
    Tool {
        #[command(subcommand)]
        command: ToolCommands,
    },
    /// Run the API server (REST + MCP)
    Api {
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
    },
    /// Check health of a running server
    Health,
}

#[derive(Subcommand)]
enum ComponentCommands {
    /// List components of a type
    List {
        /// Component type (servers, clients, hosts, agents, llms)
        r#type: String,
        /// Restrict to one scope (project, workspace, user)
        #[arg(long)]
        scope: Option<String>,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Get one component
    Get {
        r#type: String,
        name: String,
        /// Read from one scope instead of priority order
        #[arg(long)]
        scope: Option<String>,
    },
    /// Create a component from a JSON or YAML file
    Create {
        r#type: String,
        /// Path to the component definition
        file: String,
        /// Scope to create in (default: project)
        #[arg(long)]
        scope: Option<String>,
    },
    /// Replace a component from a JSON or YAML file
    Update {
        r#type: String,
        name: String,
        file: String,
        #[arg(long)]
        scope: Option<String>,
    },
    /// Merge-patch a component with inline JSON (null clears a key)
    Patch {
        r#type: String,
        name: String,
        /// JSON merge patch, e.g. '{"enabled": false}'
        patch: String,
        #[arg(long)]
        scope: Option<String>,
    },
    /// Delete a component
    Delete {
        r#type: String,
        name: String,
        #[arg(long)]
        scope: Option<String>,
        /// Confirm the deletion
        #[arg(long)]
        force: bool,
    },
    /// Show the cross-scope resolved view of a component
    Resolved { r#type: String, name: String },
}

#[derive(Subcommand)]
enum AgentCommands {
    /// Show an agent's fully dereferenced chain
    Resolve { name: String },
    /// Run an agent with an input
    Run {
        name: String,
        input: String,
        /// Override the configured step limit
        #[arg(long)]
        max_steps: Option<u32>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List the tools an agent can reach
    Tools {
        name: String,
        /// Output format (table or json)
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Subcommand)]
enum ToolCommands {
    /// Call a tool through an agent's routing table
    Call {
        /// Tool name, bare or qualified as server/tool
        name: String,
        /// Agent whose routing table dispatches the call
        #[arg(long)]
        agent: String,
        /// JSON arguments object
        #[arg(long)]
        arguments: Option<String>,
    },
}

fn report<E: miette::Diagnostic + Send + Sync + 'static>(result: Result<String, E>) {
    match result {
        Ok(output) => println!("{}", output),
        Err(e) => eprintln!("{:?}", miette::Report::new(e)),
    }
}

pub async fn run() -> miette::Result<()> {
    let cli = Cli::parse();
    let api_client = api_client::ApiClient::new(cli.api_url);

    match cli.command {
        Some(Commands::Component { command }) => match command {
            ComponentCommands::List {
                r#type,
                scope,
                format,
            } => {
                report(
                    commands::component::list(&api_client, &r#type, scope.as_deref(), &format)
                        .await,
                );
            }
            ComponentCommands::Get { r#type, name, scope } => {
                report(commands::component::get(&api_client, &r#type, &name, scope.as_deref()).await);
            }
            ComponentCommands::Create { r#type, file, scope } => {
                report(
                    commands::component::create(&api_client, &r#type, &file, scope.as_deref())
                        .await,
                );
            }
            ComponentCommands::Update {
                r#type,
                name,
                file,
                scope,
            } => {
                report(
                    commands::component::update(
                        &api_client,
                        &r#type,
                        &name,
                        &file,
                        scope.as_deref(),
                    )
                    .await,
                );
            }
            ComponentCommands::Patch {
                r#type,
                name,
                patch,
                scope,
            } => {
                report(
                    commands::component::patch(
                        &api_client,
                        &r#type,
                        &name,
                        &patch,
                        scope.as_deref(),
                    )
                    .await,
                );
            }
            ComponentCommands::Delete {
                r#type,
                name,
                scope,
                force,
            } => {
                report(
                    commands::component::delete(
                        &api_client,
                        &r#type,
                        &name,
                        scope.as_deref(),
                        force,
                    )
                    .await,
                );
            }
            ComponentCommands::Resolved { r#type, name } => {
                report(commands::component::resolved(&api_client, &r#type, &name).await);
            }
        },
        Some(Commands::Agent { command }) => match command {
            AgentCommands::Resolve { name } => {
                report(commands::agent::resolve(&api_client, &name).await);
            }
            AgentCommands::Run {
                name,
                input,
                max_steps,
                format,
            } => {
                report(commands::agent::run(&api_client, &name, &input, max_steps, &format).await);
            }
            AgentCommands::Tools { name, format } => {
                report(commands::agent::tools(&api_client, &name, &format).await);
            }
        },
        Some(Commands::Tool { command }) => match command {
            ToolCommands::Call {
                name,
                agent,
                arguments,
            } => {
                report(
                    commands::tool::call(&api_client, &name, &agent, arguments.as_deref()).await,
                );
            }
        },
        Some(Commands::Api {
            host,
            port,
            project_dir,
            workspace_dir,
            user_dir,
        }) => {
            commands::api::run(host, port, project_dir, workspace_dir, user_dir).await?;
        }
        Some(Commands::Health) => match commands::api::health(&api_client).await {
            Ok(output) => println!("{}", output),
            Err(e) => eprintln!("{:?}", e),
        },
        None => {
            // Show help when no command provided
            let _ = Cli::parse_from(["mcph", "--help"]);
        }
    }

    Ok(())
}
