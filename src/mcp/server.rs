//! MCP server implementation.
//!
//! Exposes the configuration store and execution facade as MCP tools so
//! that an MCP-speaking model can inspect and run agents directly.

use std::str::FromStr;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars,
    schemars::JsonSchema,
    tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::AppState;
use crate::api::notifier::UpdateMessage;
use crate::execution::{ExecError, LlmClient, ToolTransport};
use crate::store::{ComponentType, ConfigStore, StoreError};

// =============================================================================
// Parameter Structs
// =============================================================================

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListComponentsParams {
    #[schemars(description = "Component type: server, client, host, agent, or llm")]
    pub component_type: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct GetComponentParams {
    #[schemars(description = "Component type: server, client, host, agent, or llm")]
    pub component_type: String,
    #[schemars(description = "Component name")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AgentParams {
    #[schemars(description = "Agent name")]
    pub agent: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RunAgentParams {
    #[schemars(description = "Agent name")]
    pub agent: String,
    #[schemars(description = "User input handed to the agent")]
    pub input: String,
    #[schemars(description = "Overrides the agent's configured step limit for this run")]
    pub max_steps: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CallToolParams {
    #[schemars(description = "Agent whose routing table dispatches the call")]
    pub agent: String,
    #[schemars(description = "Tool name, bare or qualified as server/tool")]
    pub tool: String,
    #[schemars(description = "Tool arguments as a JSON object")]
    pub arguments: Option<Value>,
}

// =============================================================================
// Error mapping
// =============================================================================

fn map_store_error(e: StoreError) -> McpError {
    match e {
        StoreError::NotFound { .. } => McpError::resource_not_found(
            "component_not_found",
            Some(serde_json::json!({"error": e.to_string()})),
        ),
        StoreError::AlreadyExists { .. } | StoreError::Validation { .. } => {
            McpError::invalid_params(e.to_string(), None)
        }
        StoreError::Io { .. } | StoreError::Serde { .. } => {
            McpError::internal_error(e.to_string(), None)
        }
    }
}

fn map_exec_error(e: ExecError) -> McpError {
    match &e {
        ExecError::UnknownTool { .. } | ExecError::NotFound { .. } => McpError::resource_not_found(
            "not_found",
            Some(serde_json::json!({"error": e.to_string()})),
        ),
        ExecError::Validation { .. } | ExecError::AmbiguousTool { .. } => {
            McpError::invalid_params(e.to_string(), None)
        }
        _ => McpError::internal_error(e.to_string(), None),
    }
}

fn parse_kind(raw: &str) -> Result<ComponentType, McpError> {
    ComponentType::from_str(raw).map_err(|e| McpError::invalid_params(e.to_string(), None))
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let body = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(body)]))
}

// =============================================================================
// Server
// =============================================================================

/// MCP server over the shared application state.
///
/// Generic over the same injected backends as the HTTP handlers, so one
/// state serves both surfaces.
#[derive(Clone)]
pub struct McpServer<S: ConfigStore, T: ToolTransport, L: LlmClient> {
    state: AppState<S, T, L>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl<S, T, L> McpServer<S, T, L>
where
    S: ConfigStore + 'static,
    T: ToolTransport + 'static,
    L: LlmClient + 'static,
{
    pub fn new(state: AppState<S, T, L>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Get the tool router for this handler
    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    /// Shared state accessor, used by tests to seed the store.
    pub fn state(&self) -> &AppState<S, T, L> {
        &self.state
    }

    #[tool(
        description = "List configured components of one type, merged across scopes by priority (project > workspace > user)."
    )]
    pub async fn list_components(
        &self,
        params: Parameters<ListComponentsParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = parse_kind(&params.0.component_type)?;
        let components = self
            .state
            .store()
            .list(kind)
            .await
            .map_err(map_store_error)?;
        let total = components.len();
        json_result(&serde_json::json!({
            "items": components,
            "total": total,
        }))
    }

    #[tool(description = "Get one component, searching scopes in priority order.")]
    pub async fn get_component(
        &self,
        params: Parameters<GetComponentParams>,
    ) -> Result<CallToolResult, McpError> {
        let kind = parse_kind(&params.0.component_type)?;
        let component = self
            .state
            .store()
            .get(kind, &params.0.name)
            .await
            .map_err(map_store_error)?;
        json_result(&component)
    }

    #[tool(
        description = "Resolve an agent's full configuration chain: the agent itself, its host, clients, servers, and LLM, with cross-scope merging applied."
    )]
    pub async fn resolve_agent(
        &self,
        params: Parameters<AgentParams>,
    ) -> Result<CallToolResult, McpError> {
        let resolved = self
            .state
            .resolver()
            .resolve_agent(&params.0.agent)
            .await
            .map_err(|e| map_exec_error(e.into()))?;
        json_result(&resolved)
    }

    #[tool(
        description = "List the tools an agent can reach, after host allow/deny filters and server allowlists."
    )]
    pub async fn agent_tools(
        &self,
        params: Parameters<AgentParams>,
    ) -> Result<CallToolResult, McpError> {
        let tools = self
            .state
            .facade()
            .agent_tools(&params.0.agent)
            .await
            .map_err(map_exec_error)?;
        json_result(&tools)
    }

    #[tool(
        description = "Run an agent to completion: loop LLM turns and tool calls until a final reply or the step limit. Returns the reply and the tool-call trace."
    )]
    pub async fn run_agent(
        &self,
        params: Parameters<RunAgentParams>,
    ) -> Result<CallToolResult, McpError> {
        let outcome = self
            .state
            .facade()
            .run_agent(&params.0.agent, &params.0.input, params.0.max_steps)
            .await
            .map_err(map_exec_error)?;
        self.state.notifier().notify(UpdateMessage::AgentRan {
            agent: params.0.agent.clone(),
            steps: outcome.steps,
        });
        json_result(&outcome)
    }

    #[tool(
        description = "Call one downstream tool through an agent's routing table. Ambiguous bare names are rejected; qualify as server/tool."
    )]
    pub async fn call_tool(
        &self,
        params: Parameters<CallToolParams>,
    ) -> Result<CallToolResult, McpError> {
        let args = params.0.arguments.unwrap_or(Value::Null);
        let result = self
            .state
            .facade()
            .call_tool(&params.0.agent, &params.0.tool, args)
            .await
            .map_err(map_exec_error)?;
        json_result(&result)
    }
}

#[tool_handler]
impl<S, T, L> ServerHandler for McpServer<S, T, L>
where
    S: ConfigStore + 'static,
    T: ToolTransport + 'static,
    L: LlmClient + 'static,
{
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.instructions = Some(
            "MCP Host server - inspect layered configuration, resolve agents, and run them"
                .to_string(),
        );
        info
    }
}
