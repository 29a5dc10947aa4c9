//! LLM client for OpenAI-compatible chat-completions endpoints.

use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::execution::error::{ExecError, ExecResult};
use crate::store::LlmConfig;

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, as the wire format carries them.
    pub arguments: String,
}

/// One tool call in an assistant message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: FunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

/// One message of a chat conversation, OpenAI wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain("system", content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain("user", content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain("assistant", content)
    }

    /// Tool result message answering one tool call.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: "tool".to_string(),
            content: Some(content.into()),
            tool_calls: vec![],
            tool_call_id: Some(tool_call_id.into()),
        }
    }

    fn plain(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: vec![],
            tool_call_id: None,
        }
    }
}

/// Chat request to an LLM, with the tools the agent may call.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Tool names advertised to the model (minimal schemas).
    pub tools: Vec<String>,
}

/// LLM backend abstraction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a conversation, get the assistant's next message.
    async fn chat(&self, llm: &LlmConfig, request: ChatRequest) -> ExecResult<ChatMessage>;
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// OpenAI-compatible client over reqwest.
#[derive(Clone, Default)]
pub struct OpenAiClient {
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn body(llm: &LlmConfig, request: &ChatRequest) -> Value {
        let mut body = json!({
            "model": llm.model,
            "messages": request.messages,
        });
        if let Some(temperature) = llm.temperature {
            body["temperature"] = json!(temperature);
        }
        if let Some(max_tokens) = llm.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if !request.tools.is_empty() {
            // Downstream tool schemas are not known here; advertise
            // open object parameters and let the server validate.
            body["tools"] = Value::Array(
                request
                    .tools
                    .iter()
                    .map(|name| {
                        json!({
                            "type": "function",
                            "function": {
                                "name": name,
                                "parameters": {"type": "object"},
                            }
                        })
                    })
                    .collect(),
            );
        }
        body
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, llm: &LlmConfig, request: ChatRequest) -> ExecResult<ChatMessage> {
        let url = format!(
            "{}/chat/completions",
            llm.base_url.trim_end_matches('/')
        );
        let mut http = self.client.post(&url).json(&Self::body(llm, &request));

        if let Some(key_env) = &llm.api_key_env {
            let key = env::var(key_env).map_err(|_| ExecError::Auth {
                message: format!("environment variable '{key_env}' is not set"),
            })?;
            http = http.bearer_auth(key);
        }

        let response = http.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ExecError::from_status(status, body));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| ExecError::Llm {
                message: "completion contained no choices".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm() -> LlmConfig {
        LlmConfig {
            provider: "openai".to_string(),
            base_url: "http://localhost:8080/v1/".to_string(),
            model: "test-model".to_string(),
            api_key_env: None,
            temperature: Some(0.2),
            max_tokens: Some(256),
        }
    }

    #[test]
    fn test_body_includes_sampling_options() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            tools: vec![],
        };
        let body = OpenAiClient::body(&llm(), &request);
        assert_eq!(body["model"], "test-model");
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["max_tokens"], 256);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn test_body_advertises_tools() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            tools: vec!["read_file".to_string()],
        };
        let body = OpenAiClient::body(&llm(), &request);
        assert_eq!(body["tools"][0]["function"]["name"], "read_file");
    }

    #[test]
    fn test_assistant_message_round_trip() {
        let raw = r#"{
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "read_file", "arguments": "{\"path\": \"a.txt\"}"}
            }]
        }"#;
        let message: ChatMessage = serde_json::from_str(raw).unwrap();
        assert_eq!(message.role, "assistant");
        assert_eq!(message.content, None);
        assert_eq!(message.tool_calls[0].function.name, "read_file");
    }

    #[test]
    fn test_tool_result_message_shape() {
        let message = ChatMessage::tool_result("call_1", "ok");
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_1");
        assert!(value.get("tool_calls").is_none());
    }
}
