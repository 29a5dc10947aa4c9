//! Agent execution handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::api::notifier::UpdateMessage;
use crate::execution::{LlmClient, RunOutcome, ToolRoute, ToolTransport};
use crate::store::ConfigStore;

use super::{ApiErr, ErrorResponse, exec_error};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RunRequest {
    /// User input handed to the agent.
    pub input: String,
    /// Overrides the agent's configured step limit for this run.
    pub max_steps: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ToolCallRequest {
    /// Agent whose routing table dispatches the call.
    pub agent: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub arguments: Value,
}

#[utoipa::path(
    post,
    path = "/api/v1/execution/agents/{name}/run",
    tag = "execution",
    params(("name" = String, Path, description = "Agent name")),
    request_body = RunRequest,
    responses(
        (status = 200, description = "Agent run finished", body = RunOutcome),
        (status = 404, description = "Agent not found", body = ErrorResponse),
        (status = 422, description = "Step limit reached or dangling reference", body = ErrorResponse),
        (status = 502, description = "Upstream failure", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
/// Run an agent to completion and return its reply with the tool trace
pub async fn run_agent<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path(name): Path<String>,
    Json(request): Json<RunRequest>,
) -> Result<Json<RunOutcome>, ApiErr> {
    let outcome = state
        .facade()
        .run_agent(&name, &request.input, request.max_steps)
        .await
        .map_err(exec_error)?;

    state.notifier().notify(UpdateMessage::AgentRan {
        agent: name,
        steps: outcome.steps,
    });

    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/v1/execution/agents/{name}/tools",
    tag = "execution",
    params(("name" = String, Path, description = "Agent name")),
    responses(
        (status = 200, description = "Routable tools", body = Vec<ToolRoute>),
        (status = 404, description = "Agent not found", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
/// List the tools an agent can reach, after host and server filters
pub async fn agent_tools<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ToolRoute>>, ApiErr> {
    let tools = state.facade().agent_tools(&name).await.map_err(exec_error)?;
    Ok(Json(tools))
}

#[utoipa::path(
    post,
    path = "/api/v1/tools/{name}/call",
    tag = "execution",
    params(("name" = String, Path, description = "Tool name, bare or server/tool")),
    request_body = ToolCallRequest,
    responses(
        (status = 200, description = "Tool result"),
        (status = 404, description = "Unknown tool or agent", body = ErrorResponse),
        (status = 409, description = "Ambiguous tool name", body = ErrorResponse),
        (status = 501, description = "Transport not supported", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
/// Call one tool through an agent's routing table
pub async fn call_tool<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Path(name): Path<String>,
    Json(request): Json<ToolCallRequest>,
) -> Result<Json<Value>, ApiErr> {
    let result = state
        .facade()
        .call_tool(&request.agent, &name, request.arguments)
        .await
        .map_err(exec_error)?;
    Ok(Json(result))
}
