//! OpenAI-compatible chat completions endpoint.
//!
//! The `model` field names an agent. The agent runs to completion and the
//! reply is returned in the chat-completion wire shape, optionally replayed
//! as an SSE stream for clients that sent `stream: true`.

use std::convert::Infallible;

use axum::{
    Json,
    extract::State,
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
};
use chrono::Utc;
use futures_util::stream;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::instrument;
use utoipa::ToSchema;

use crate::api::AppState;
use crate::api::notifier::UpdateMessage;
use crate::execution::{ChatMessage, LlmClient, ToolTransport};
use crate::store::ConfigStore;

use super::{ApiErr, ErrorResponse, bad_request, exec_error};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatCompletionRequest {
    /// Agent name, carried in the OpenAI `model` slot.
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Serialize, ToSchema)]
pub struct ChatChoice {
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: String,
}

#[derive(Serialize, ToSchema)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
}

fn completion_id() -> String {
    format!("chatcmpl-{}", Utc::now().timestamp_micros())
}

#[utoipa::path(
    post,
    path = "/v1/chat/completions",
    tag = "chat",
    request_body = ChatCompletionRequest,
    responses(
        (status = 200, description = "Chat completion", body = ChatCompletionResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown agent", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(model = %request.model))]
/// OpenAI-compatible completions, backed by an agent run
pub async fn chat_completions<S: ConfigStore, T: ToolTransport, L: LlmClient>(
    State(state): State<AppState<S, T, L>>,
    Json(request): Json<ChatCompletionRequest>,
) -> Result<Response, ApiErr> {
    let input = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .and_then(|m| m.content.clone())
        .ok_or_else(|| bad_request("request contains no user message"))?;

    let outcome = state
        .facade()
        .run_agent(&request.model, &input, None)
        .await
        .map_err(exec_error)?;

    state.notifier().notify(UpdateMessage::AgentRan {
        agent: request.model.clone(),
        steps: outcome.steps,
    });

    let id = completion_id();
    let created = Utc::now().timestamp();

    if request.stream {
        return Ok(stream_response(id, created, request.model, outcome.reply));
    }

    Ok(Json(ChatCompletionResponse {
        id,
        object: "chat.completion".to_string(),
        created,
        model: request.model,
        choices: vec![ChatChoice {
            index: 0,
            message: ChatMessage::assistant(outcome.reply),
            finish_reason: "stop".to_string(),
        }],
    })
    .into_response())
}

/// Replay a finished completion as SSE chunks: role, content, finish,
/// then the `[DONE]` sentinel.
fn stream_response(id: String, created: i64, model: String, reply: String) -> Response {
    let chunk = |delta: serde_json::Value, finish: Option<&str>| {
        json!({
            "id": id,
            "object": "chat.completion.chunk",
            "created": created,
            "model": model,
            "choices": [{"index": 0, "delta": delta, "finish_reason": finish}],
        })
        .to_string()
    };

    let events = vec![
        Event::default().data(chunk(json!({"role": "assistant"}), None)),
        Event::default().data(chunk(json!({"content": reply}), None)),
        Event::default().data(chunk(json!({}), Some("stop"))),
        Event::default().data("[DONE]"),
    ];

    Sse::new(stream::iter(
        events.into_iter().map(Ok::<_, Infallible>),
    ))
    .into_response()
}
