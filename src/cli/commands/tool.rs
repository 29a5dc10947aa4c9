//! Tool invocation command.

use serde_json::Value;

use crate::cli::api_client::ApiClient;
use crate::cli::error::{CliError, CliResult};

/// Call one tool through an agent's routing table.
///
/// `name` may be bare (`search`) or qualified (`fs/search`); ambiguous
/// bare names are rejected by the server.
pub async fn call(
    api_client: &ApiClient,
    name: &str,
    agent: &str,
    arguments: Option<&str>,
) -> CliResult<String> {
    let arguments: Value = match arguments {
        Some(raw) => serde_json::from_str(raw).map_err(|e| CliError::InvalidArgument {
            message: format!("arguments are not valid JSON: {e}"),
        })?,
        None => Value::Object(Default::default()),
    };

    // Qualified names contain a slash; encode it so the name stays one
    // path segment.
    let name = name.replace('/', "%2F");
    let response = api_client
        .post(&format!("/api/v1/tools/{name}/call"))
        .json(&serde_json::json!({"agent": agent, "arguments": arguments}))
        .send()
        .await?;
    let result: Value = ApiClient::handle_response(response).await?;
    Ok(serde_json::to_string_pretty(&result)?)
}
