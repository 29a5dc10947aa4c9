//! Tests for store domain models.

use std::str::FromStr;

use serde_json::json;

use crate::store::models::*;

#[test]
fn test_scope_priority_order() {
    let order: Vec<Scope> = Scope::iter_by_priority().collect();
    assert_eq!(order, vec![Scope::Project, Scope::Workspace, Scope::User]);

    let merge: Vec<Scope> = Scope::iter_by_merge_order().collect();
    assert_eq!(merge, vec![Scope::User, Scope::Workspace, Scope::Project]);
}

#[test]
fn test_scope_from_str() {
    assert_eq!(Scope::from_str("project").unwrap(), Scope::Project);
    assert_eq!(Scope::from_str("workspace").unwrap(), Scope::Workspace);
    assert_eq!(Scope::from_str("user").unwrap(), Scope::User);
    assert!(Scope::from_str("global").is_err());
}

#[test]
fn test_component_type_segments_and_parse() {
    for kind in ComponentType::all() {
        // Both singular and plural forms parse back
        assert_eq!(ComponentType::from_str(&kind.to_string()).unwrap(), kind);
        assert_eq!(ComponentType::from_str(kind.segment()).unwrap(), kind);
    }
    assert!(ComponentType::from_str("widgets").is_err());
}

#[test]
fn test_component_serializes_flat_with_type_tag() {
    let component = Component::new(
        "assistant",
        ComponentSpec::Agent(AgentConfig {
            host: "main".to_string(),
            llm: Some("gpt".to_string()),
            system_prompt: Some("Be brief.".to_string()),
            max_steps: 8,
        }),
    );

    let value = serde_json::to_value(&component).unwrap();
    assert_eq!(value["name"], "assistant");
    assert_eq!(value["type"], "agent");
    assert_eq!(value["host"], "main");
    // Timestamps omitted when unset
    assert!(value.get("created_at").is_none());
}

#[test]
fn test_component_deserializes_with_defaults() {
    let component: Component = serde_json::from_value(json!({
        "name": "assistant",
        "type": "agent",
        "host": "main"
    }))
    .unwrap();

    assert_eq!(component.kind(), ComponentType::Agent);
    let ComponentSpec::Agent(agent) = component.spec else {
        panic!("expected agent");
    };
    assert_eq!(agent.llm, None);
    assert_eq!(agent.max_steps, 8);
}

#[test]
fn test_server_defaults() {
    let component: Component = serde_json::from_value(json!({
        "name": "fs",
        "type": "server",
        "transport": {"kind": "stdio", "command": "mcp-fs"}
    }))
    .unwrap();

    let ComponentSpec::Server(server) = component.spec else {
        panic!("expected server");
    };
    assert!(server.enabled);
    assert_eq!(server.timeout_ms, None);
    match server.transport {
        Transport::Stdio { command, args, .. } => {
            assert_eq!(command, "mcp-fs");
            assert!(args.is_empty());
        }
        other => panic!("expected stdio transport, got {other:?}"),
    }
}

#[test]
fn test_retry_policy_default() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.max_retries, 3);
    assert_eq!(policy.initial_backoff_ms, 250);
    assert_eq!(policy.max_backoff_ms, 5000);
}

#[test]
fn test_validate_name() {
    assert!(validate_name("fs-tools").is_ok());
    assert!(validate_name("").is_err());
    assert!(validate_name("  ").is_err());
    assert!(validate_name("a/b").is_err());
    assert!(validate_name("..").is_err());
}

#[test]
fn test_root_config_round_trip() {
    let root = RootConfig {
        llm: Some("gpt".to_string()),
        request_timeout_ms: None,
        log_level: None,
        defaults: [("agents".to_string(), json!({"max_steps": 4}))]
            .into_iter()
            .collect(),
    };
    let raw = serde_json::to_string(&root).unwrap();
    let back: RootConfig = serde_json::from_str(&raw).unwrap();
    assert_eq!(back, root);
}
