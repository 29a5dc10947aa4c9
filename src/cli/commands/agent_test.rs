//! CLI agent command tests against a live in-process server.

use std::collections::BTreeMap;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::api::notifier::ChangeNotifier;
use crate::api::{AppState, create_router};
use crate::cli::api_client::ApiClient;
use crate::cli::commands::{agent, tool};
use crate::execution::{ChatMessage, MockLlmClient, MockToolTransport};
use crate::store::{
    AgentConfig, ClientConfig, Component, ComponentSpec, ConfigStore, FileStore, HostConfig,
    LlmConfig, RetryPolicy, Scope, ServerConfig, StoreLayout, Transport,
};

fn init_crypto() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

fn component(name: &str, spec: ComponentSpec) -> Component {
    Component {
        name: name.to_string(),
        spec,
        created_at: None,
        updated_at: None,
    }
}

async fn spawn_server(
    transport: MockToolTransport,
    llm: MockLlmClient,
) -> (TempDir, ApiClient) {
    init_crypto();
    let dir = TempDir::new().unwrap();
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

    let state = AppState::new(
        store,
        Arc::new(transport),
        Arc::new(llm),
        ChangeNotifier::new(),
    );
    let app = create_router(state, CancellationToken::new());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (dir, ApiClient::new(Some(format!("http://{addr}"))))
}

#[tokio::test(flavor = "multi_thread")]
async fn run_prints_reply_and_steps() {
    let mut transport = MockToolTransport::new();
    transport
        .expect_list_tools()
        .returning(|_| Ok(vec!["search".to_string()]));
    let mut llm = MockLlmClient::new();
    llm.expect_chat()
        .returning(|_, _| Ok(ChatMessage::assistant("done and dusted")));

    let (_dir, client) = spawn_server(transport, llm).await;

    let out = agent::run(&client, "assistant", "hello", None, "text")
        .await
        .unwrap();
    assert!(out.starts_with("done and dusted"));
    assert!(out.contains("(1 steps)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn tools_renders_route_table() {
    let mut transport = MockToolTransport::new();
    transport
        .expect_list_tools()
        .returning(|_| Ok(vec!["search".to_string()]));

    let (_dir, client) = spawn_server(transport, MockLlmClient::new()).await;

    let out = agent::tools(&client, "assistant", "table").await.unwrap();
    assert!(out.contains("search"));
    assert!(out.contains("fs"));
    assert!(out.contains("fs-client"));
}

#[tokio::test(flavor = "multi_thread")]
async fn resolve_returns_full_chain() {
    let (_dir, client) = spawn_server(MockToolTransport::new(), MockLlmClient::new()).await;

    let out = agent::resolve(&client, "assistant").await.unwrap();
    assert!(out.contains("\"host_name\": \"main\""));
    assert!(out.contains("\"llm_name\": \"gpt\""));
}

#[tokio::test(flavor = "multi_thread")]
async fn tool_call_returns_result() {
    let mut transport = MockToolTransport::new();
    transport
        .expect_list_tools()
        .returning(|_| Ok(vec!["search".to_string()]));
    transport
        .expect_call_tool()
        .returning(|_, _, _| Ok(serde_json::json!({"hits": 2})));

    let (_dir, client) = spawn_server(transport, MockLlmClient::new()).await;

    let out = tool::call(&client, "search", "assistant", Some(r#"{"query": "x"}"#))
        .await
        .unwrap();
    assert!(out.contains("\"hits\": 2"));
}
