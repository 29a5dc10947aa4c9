//! Agent commands: resolve, run, and list tools.

use serde::Deserialize;
use serde_json::Value;
use tabled::{Table, Tabled};

use crate::cli::api_client::ApiClient;
use crate::cli::error::CliResult;
use crate::cli::utils::{apply_table_style, truncate_with_ellipsis};

#[derive(Debug, Deserialize)]
struct RunOutcome {
    reply: String,
    steps: u32,
    tool_calls: Vec<ToolCallRecord>,
}

#[derive(Debug, Deserialize)]
struct ToolCallRecord {
    tool: String,
    server: String,
    arguments: Value,
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ToolRoute {
    client: String,
    server: String,
    tool: String,
}

#[derive(Tabled)]
struct RouteDisplay {
    #[tabled(rename = "Tool")]
    tool: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Client")]
    client: String,
}

/// Fully dereferenced agent chain as pretty JSON
pub async fn resolve(api_client: &ApiClient, name: &str) -> CliResult<String> {
    let response = api_client
        .get(&format!("/api/v1/config/resolved/agents/{name}/full"))
        .send()
        .await?;
    let resolved: Value = ApiClient::handle_response(response).await?;
    Ok(serde_json::to_string_pretty(&resolved)?)
}

/// Run an agent and print its reply with the tool trace
pub async fn run(
    api_client: &ApiClient,
    name: &str,
    input: &str,
    max_steps: Option<u32>,
    format: &str,
) -> CliResult<String> {
    let mut body = serde_json::json!({"input": input});
    if let Some(max_steps) = max_steps {
        body["max_steps"] = serde_json::json!(max_steps);
    }
    let response = api_client
        .post(&format!("/api/v1/execution/agents/{name}/run"))
        .json(&body)
        .send()
        .await?;
    let outcome: RunOutcome = ApiClient::handle_response(response).await?;

    if format == "json" {
        return Ok(serde_json::to_string_pretty(&serde_json::json!({
            "reply": outcome.reply,
            "steps": outcome.steps,
            "tool_calls": outcome.tool_calls.iter().map(|t| serde_json::json!({
                "tool": t.tool,
                "server": t.server,
                "arguments": t.arguments,
                "result": t.result,
            })).collect::<Vec<_>>(),
        }))?);
    }

    let mut out = outcome.reply;
    if !outcome.tool_calls.is_empty() {
        out.push_str("\n\nTool calls:");
        for call in &outcome.tool_calls {
            out.push_str(&format!(
                "\n  {}/{} {}",
                call.server,
                call.tool,
                truncate_with_ellipsis(&call.arguments.to_string(), 60)
            ));
        }
    }
    out.push_str(&format!("\n\n({} steps)", outcome.steps));
    Ok(out)
}

/// List the tools an agent can reach
pub async fn tools(api_client: &ApiClient, name: &str, format: &str) -> CliResult<String> {
    let response = api_client
        .get(&format!("/api/v1/execution/agents/{name}/tools"))
        .send()
        .await?;
    let routes: Vec<ToolRoute> = ApiClient::handle_response(response).await?;

    if format == "json" {
        return Ok(serde_json::to_string_pretty(
            &routes
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "client": r.client,
                        "server": r.server,
                        "tool": r.tool,
                    })
                })
                .collect::<Vec<_>>(),
        )?);
    }

    if routes.is_empty() {
        return Ok(format!("Agent '{name}' can reach no tools."));
    }
    let rows: Vec<RouteDisplay> = routes
        .into_iter()
        .map(|r| RouteDisplay {
            tool: r.tool,
            server: r.server,
            client: r.client,
        })
        .collect();
    let mut table = Table::new(rows);
    apply_table_style(&mut table);
    Ok(table.to_string())
}
