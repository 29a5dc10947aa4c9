//! API route configuration.

use axum::Router;
use axum::extract::State;
use axum::routing::{delete, get, patch, post, put};
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use super::events::event_stream;
use super::state::AppState;
use super::v1::{
    self, ChatChoice, ChatCompletionRequest, ChatCompletionResponse, ComponentList, ErrorResponse,
    HealthResponse, RunRequest, ToolCallRequest,
};
use crate::execution::{
    ChatMessage, FunctionCall, LlmClient, RunOutcome, ToolCall, ToolCallRecord, ToolRoute,
    ToolTransport,
};
use crate::mcp::create_mcp_service;
use crate::resolve::{ResolvedAgent, ResolvedClient};
use crate::store::{Component, ConfigStore};

/// Build routes with generic store, transport, and LLM client types.
///
/// This macro reduces boilerplate when registering handlers that are generic
/// over the injected backends. It applies the turbofish operator
/// automatically.
macro_rules! routes {
    ($S:ty, $T:ty, $L:ty => {
        $($method:ident $path:literal => $($handler:ident)::+),* $(,)?
    }) => {{
        let router = Router::new();
        $(
            let router = router.route($path, $method($($handler)::+::<$S, $T, $L>));
        )*
        router
    }};
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MCP Host API",
        version = "0.3.0",
        description = "Layered configuration and agent execution for MCP hosts",
        license(name = "GPL-2.0")
    ),
    paths(
        v1::root,
        v1::health,
        v1::list_components,
        v1::create_component,
        v1::get_component,
        v1::put_component,
        v1::patch_component,
        v1::delete_component,
        v1::resolved_component,
        v1::resolved_agent,
        v1::run_agent,
        v1::agent_tools,
        v1::call_tool,
        v1::chat_completions,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            Component,
            ComponentList,
            ResolvedAgent,
            ResolvedClient,
            RunRequest,
            RunOutcome,
            ToolCallRecord,
            ToolCallRequest,
            ToolRoute,
            ChatCompletionRequest,
            ChatCompletionResponse,
            ChatChoice,
            ChatMessage,
            ToolCall,
            FunctionCall,
        )
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "config", description = "Layered component configuration"),
        (name = "execution", description = "Agent runs and tool calls"),
        (name = "chat", description = "OpenAI-compatible chat surface")
    )
)]
pub struct ApiDoc;

/// Create the API router with OpenAPI documentation and the MCP service.
pub fn create_router<S, T, L>(
    state: AppState<S, T, L>,
    cancellation_token: CancellationToken,
) -> Router
where
    S: ConfigStore + 'static,
    T: ToolTransport + 'static,
    L: LlmClient + 'static,
{
    let api = ApiDoc::openapi();

    // System routes (non-generic)
    let system_routes = Router::new()
        .route("/", get(v1::root))
        .route("/health", get(v1::health));

    // Config routes (generic over the injected backends)
    let config_routes = routes!(S, T, L => {
        get "/api/v1/config/components/{type}" => v1::list_components,
        post "/api/v1/config/components/{type}" => v1::create_component,
        get "/api/v1/config/components/{type}/{name}" => v1::get_component,
        put "/api/v1/config/components/{type}/{name}" => v1::put_component,
        patch "/api/v1/config/components/{type}/{name}" => v1::patch_component,
        delete "/api/v1/config/components/{type}/{name}" => v1::delete_component,
        get "/api/v1/config/resolved/{type}/{name}" => v1::resolved_component,
        get "/api/v1/config/resolved/agents/{name}/full" => v1::resolved_agent,
    });

    let execution_routes = routes!(S, T, L => {
        post "/api/v1/execution/agents/{name}/run" => v1::run_agent,
        get "/api/v1/execution/agents/{name}/tools" => v1::agent_tools,
        post "/api/v1/tools/{name}/call" => v1::call_tool,
        post "/v1/chat/completions" => v1::chat_completions,
    });

    let events_route = Router::new().route(
        "/api/v1/events",
        get(|State(state): State<AppState<S, T, L>>| async move {
            event_stream(state.notifier())
        }),
    );

    let mcp_service = create_mcp_service(state.clone(), cancellation_token);

    system_routes
        .merge(config_routes)
        .merge(execution_routes)
        .merge(events_route)
        .merge(Scalar::with_url("/docs", api))
        .nest_service("/mcp", mcp_service)
        .with_state(state)
}
