//! Integration tests for component configuration endpoints.

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
use crate::execution::{MockLlmClient, MockToolTransport};
use crate::store::{FileStore, StoreLayout};

/// Create a test app over a file store rooted in a temp directory
fn test_app() -> (TempDir, axum::Router) {
    let dir = TempDir::new().unwrap();
    let layout = StoreLayout {
        project: dir.path().join("project"),
        workspace: dir.path().join("workspace"),
        user: dir.path().join("user"),
    };
    let state = AppState::new(
        Arc::new(FileStore::new(layout)),
        Arc::new(MockToolTransport::new()),
        Arc::new(MockLlmClient::new()),
        ChangeNotifier::new(),
    );
    (dir, create_router(state, CancellationToken::new()))
}

/// Helper to parse JSON response body
async fn json_body(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn server_body(name: &str) -> Value {
    json!({
        "name": name,
        "transport": {"kind": "http", "url": "http://localhost:9100"}
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn list_components_initially_empty() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(get("/api/v1/config/components/servers"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_and_get_component() {
    let (_dir, app) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/config/components/servers",
            server_body("fs"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    assert_eq!(created["name"], "fs");
    assert_eq!(created["type"], "server");
    assert!(created["created_at"].is_string());

    let response = app
        .oneshot(get("/api/v1/config/components/servers/fs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["transport"]["url"], "http://localhost:9100");
}

#[tokio::test(flavor = "multi_thread")]
async fn create_rejects_mismatched_type_tag() {
    let (_dir, app) = test_app();

    let mut body = server_body("fs");
    body["type"] = json!("agent");
    let response = app
        .oneshot(json_request("POST", "/api/v1/config/components/servers", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_duplicate_in_scope_conflicts() {
    let (_dir, app) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/config/components/servers",
            server_body("fs"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/config/components/servers",
            server_body("fs"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test(flavor = "multi_thread")]
async fn get_prefers_higher_priority_scope() {
    let (_dir, app) = test_app();

    let mut user = server_body("fs");
    user["transport"]["url"] = json!("http://user:1");
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/config/components/servers?scope=user",
            user,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let mut project = server_body("fs");
    project["transport"]["url"] = json!("http://project:1");
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/config/components/servers?scope=project",
            project,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/api/v1/config/components/servers/fs"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["transport"]["url"], "http://project:1");

    // Explicit scope bypasses priority
    let response = app
        .oneshot(get("/api/v1/config/components/servers/fs?scope=user"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["transport"]["url"], "http://user:1");
}

#[tokio::test(flavor = "multi_thread")]
async fn patch_merges_and_null_clears() {
    let (_dir, app) = test_app();

    let mut body = server_body("fs");
    body["timeout_ms"] = json!(5000);
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/config/components/servers", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let patch = json!({
        "timeout_ms": null,
        "transport": {"url": "http://patched:1"}
    });
    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            "/api/v1/config/components/servers/fs",
            patch,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    // Sibling keys of the patched object survive the merge
    assert_eq!(body["transport"]["kind"], "http");
    assert_eq!(body["transport"]["url"], "http://patched:1");
    assert!(body.get("timeout_ms").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn put_replaces_and_preserves_created_at() {
    let (_dir, app) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/config/components/servers",
            server_body("fs"),
        ))
        .await
        .unwrap();
    let created = json_body(response).await;

    let mut replacement = server_body("fs");
    replacement["enabled"] = json!(false);
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/v1/config/components/servers/fs",
            replacement,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["enabled"], false);
    assert_eq!(body["created_at"], created["created_at"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_component_then_404() {
    let (_dir, app) = test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/config/components/servers",
            server_body("fs"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/config/components/servers/fs")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(get("/api/v1/config/components/servers/fs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_component_type_is_404() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(get("/api/v1/config/components/widgets"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_scope_is_400() {
    let (_dir, app) = test_app();

    let response = app
        .oneshot(get("/api/v1/config/components/servers?scope=galaxy"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn resolved_component_merges_scope_fragments() {
    let (_dir, app) = test_app();

    let mut user = server_body("fs");
    user["timeout_ms"] = json!(9000);
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/config/components/servers?scope=user",
            user,
        ))
        .await
        .unwrap();

    let mut project = server_body("fs");
    project["transport"]["url"] = json!("http://project:1");
    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/config/components/servers?scope=project",
            project,
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(get("/api/v1/config/resolved/servers/fs"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    // Project fragment wins on conflicts, user-only keys survive
    assert_eq!(body["transport"]["url"], "http://project:1");
    assert_eq!(body["timeout_ms"], 9000);
}

#[tokio::test(flavor = "multi_thread")]
async fn resolved_agent_reports_dangling_reference() {
    let (_dir, app) = test_app();

    let llm = json!({
        "name": "gpt",
        "provider": "openai",
        "base_url": "http://localhost:8080/v1",
        "model": "gpt-test"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/config/components/llms", llm))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let agent = json!({
        "name": "assistant",
        "host": "missing-host",
        "llm": "gpt"
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/config/components/agents", agent))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(get("/api/v1/config/resolved/agents/assistant/full"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("missing-host"));
}
