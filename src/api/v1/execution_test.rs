//! Integration tests for agent execution endpoints.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use crate::api::notifier::ChangeNotifier;
use crate::api::{AppState, create_router};
use crate::execution::{ChatMessage, MockLlmClient, MockToolTransport};
use crate::store::{
    AgentConfig, ClientConfig, Component, ComponentSpec, ConfigStore, FileStore, HostConfig,
    LlmConfig, RetryPolicy, Scope, ServerConfig, StoreLayout, Transport,
};

fn component(name: &str, spec: ComponentSpec) -> Component {
    Component {
        name: name.to_string(),
        spec,
        created_at: None,
        updated_at: None,
    }
}

/// Seed a complete agent chain: fs server, fs-client, main host, gpt llm,
/// assistant agent.
async fn seeded_store(dir: &TempDir) -> Arc<FileStore> {
    let layout = StoreLayout {
        project: dir.path().join("project"),
        workspace: dir.path().join("workspace"),
        user: dir.path().join("user"),
    };
    let store = Arc::new(FileStore::new(layout));

    let specs = [
        component(
            "fs",
            ComponentSpec::Server(ServerConfig {
                transport: Transport::Http {
                    url: "http://localhost:9100".to_string(),
                    headers: BTreeMap::new(),
                },
                enabled: true,
                timeout_ms: None,
                tools: None,
            }),
        ),
        component(
            "fs-client",
            ComponentSpec::Client(ClientConfig {
                server: "fs".to_string(),
                request_timeout_ms: None,
                retry: RetryPolicy::default(),
                roots: vec![],
            }),
        ),
        component(
            "main",
            ComponentSpec::Host(HostConfig {
                clients: vec!["fs-client".to_string()],
                allowed_tools: None,
                denied_tools: vec![],
            }),
        ),
        component(
            "gpt",
            ComponentSpec::Llm(LlmConfig {
                provider: "openai".to_string(),
                base_url: "http://localhost:8080/v1".to_string(),
                model: "gpt-test".to_string(),
                api_key_env: None,
                temperature: None,
                max_tokens: None,
            }),
        ),
        component(
            "assistant",
            ComponentSpec::Agent(AgentConfig {
                host: "main".to_string(),
                llm: Some("gpt".to_string()),
                system_prompt: None,
                max_steps: 8,
            }),
        ),
    ];
    for c in &specs {
        store.create(Scope::Project, c).await.unwrap();
    }
    store
}

async fn test_app(transport: MockToolTransport, llm: MockLlmClient) -> (TempDir, axum::Router) {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir).await;
    let state = AppState::new(
        store,
        Arc::new(transport),
        Arc::new(llm),
        ChangeNotifier::new(),
    );
    (dir, create_router(state, CancellationToken::new()))
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn run_agent_returns_reply() {
    let mut transport = MockToolTransport::new();
    transport
        .expect_list_tools()
        .returning(|_| Ok(vec!["search".to_string()]));
    let mut llm = MockLlmClient::new();
    llm.expect_chat()
        .returning(|_, _| Ok(ChatMessage::assistant("all done")));

    let (_dir, app) = test_app(transport, llm).await;

    let response = app
        .oneshot(post_json(
            "/api/v1/execution/agents/assistant/run",
            json!({"input": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["reply"], "all done");
    assert_eq!(body["steps"], 1);
    assert_eq!(body["tool_calls"].as_array().unwrap().len(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn run_unknown_agent_is_404() {
    let (_dir, app) = test_app(MockToolTransport::new(), MockLlmClient::new()).await;

    let response = app
        .oneshot(post_json(
            "/api/v1/execution/agents/nobody/run",
            json!({"input": "hello"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn agent_tools_lists_routes() {
    let mut transport = MockToolTransport::new();
    transport
        .expect_list_tools()
        .returning(|_| Ok(vec!["search".to_string(), "read_file".to_string()]));

    let (_dir, app) = test_app(transport, MockLlmClient::new()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/execution/agents/assistant/tools")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let tools: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["tool"].as_str().unwrap())
        .collect();
    assert_eq!(tools, vec!["read_file", "search"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn call_tool_dispatches_to_transport() {
    let mut transport = MockToolTransport::new();
    transport
        .expect_list_tools()
        .returning(|_| Ok(vec!["search".to_string()]));
    transport
        .expect_call_tool()
        .withf(|_, tool, args| tool == "search" && args["query"] == "rust")
        .returning(|_, _, _| Ok(json!({"hits": 3})));

    let (_dir, app) = test_app(transport, MockLlmClient::new()).await;

    let response = app
        .oneshot(post_json(
            "/api/v1/tools/search/call",
            json!({"agent": "assistant", "arguments": {"query": "rust"}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["hits"], 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn call_unknown_tool_is_404() {
    let mut transport = MockToolTransport::new();
    transport
        .expect_list_tools()
        .returning(|_| Ok(vec!["search".to_string()]));

    let (_dir, app) = test_app(transport, MockLlmClient::new()).await;

    let response = app
        .oneshot(post_json(
            "/api/v1/tools/teleport/call",
            json!({"agent": "assistant"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
