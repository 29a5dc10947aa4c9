//! Domain entities for the configuration store.
//!
//! Components are flat, named configuration records (servers, clients,
//! hosts, agents, LLMs) stored per scope. A component name is unique
//! within its type within a scope; the same name may appear in several
//! scopes, in which case the highest-priority scope wins.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::{StoreError, StoreResult};

/// Configuration scope, ordered by priority.
///
/// Project beats workspace beats user ("current context wins").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Project,
    Workspace,
    User,
}

impl Scope {
    /// All scopes, highest priority first.
    pub fn iter_by_priority() -> impl Iterator<Item = Scope> {
        [Scope::Project, Scope::Workspace, Scope::User].into_iter()
    }

    /// All scopes, lowest priority first (merge order).
    pub fn iter_by_merge_order() -> impl Iterator<Item = Scope> {
        [Scope::User, Scope::Workspace, Scope::Project].into_iter()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Project => write!(f, "project"),
            Scope::Workspace => write!(f, "workspace"),
            Scope::User => write!(f, "user"),
        }
    }
}

impl FromStr for Scope {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(Scope::Project),
            "workspace" => Ok(Scope::Workspace),
            "user" => Ok(Scope::User),
            other => Err(StoreError::Validation {
                message: format!(
                    "unknown scope '{other}' (expected project, workspace, or user)"
                ),
            }),
        }
    }
}

/// Component type, addressable as a URL path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Server,
    Client,
    Host,
    Agent,
    Llm,
}

impl ComponentType {
    /// Plural path segment used in URLs and on-disk directories.
    pub fn segment(&self) -> &'static str {
        match self {
            ComponentType::Server => "servers",
            ComponentType::Client => "clients",
            ComponentType::Host => "hosts",
            ComponentType::Agent => "agents",
            ComponentType::Llm => "llms",
        }
    }

    pub fn all() -> impl Iterator<Item = ComponentType> {
        [
            ComponentType::Server,
            ComponentType::Client,
            ComponentType::Host,
            ComponentType::Agent,
            ComponentType::Llm,
        ]
        .into_iter()
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentType::Server => write!(f, "server"),
            ComponentType::Client => write!(f, "client"),
            ComponentType::Host => write!(f, "host"),
            ComponentType::Agent => write!(f, "agent"),
            ComponentType::Llm => write!(f, "llm"),
        }
    }
}

impl FromStr for ComponentType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept both singular and plural forms; URLs use the plural segment.
        match s {
            "server" | "servers" => Ok(ComponentType::Server),
            "client" | "clients" => Ok(ComponentType::Client),
            "host" | "hosts" => Ok(ComponentType::Host),
            "agent" | "agents" => Ok(ComponentType::Agent),
            "llm" | "llms" => Ok(ComponentType::Llm),
            other => Err(StoreError::Validation {
                message: format!("unknown component type '{other}'"),
            }),
        }
    }
}

/// How a downstream MCP server is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Transport {
    /// Local subprocess speaking MCP over stdio.
    Stdio {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default)]
        env: BTreeMap<String, String>,
    },
    /// Remote server reached over HTTP.
    Http {
        url: String,
        #[serde(default)]
        headers: BTreeMap<String, String>,
    },
}

/// Downstream tool server definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ServerConfig {
    pub transport: Transport,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// If set, only these tools are exposed by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}

/// Retry policy for a client's calls to its server.
///
/// Backoff math lives in `execution::retry`; this is the wire/config shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 250,
            multiplier: 2.0,
            max_backoff_ms: 5000,
        }
    }
}

/// A host-side connection to one server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ClientConfig {
    /// Name of the server component this client connects to.
    pub server: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    #[serde(default)]
    pub retry: RetryPolicy,
    /// Filesystem roots granted to the server, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roots: Vec<String>,
}

/// A host groups clients and filters the tools they expose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HostConfig {
    /// Client component names, in declaration order.
    pub clients: Vec<String>,
    /// If set, only these tool names pass the host filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
    /// Denied tool names. Deny wins over allow.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub denied_tools: Vec<String>,
}

/// An agent wires a host to an LLM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AgentConfig {
    /// Name of the host component providing tools.
    pub host: String,
    /// Name of the LLM component. Falls back to the scope root default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_max_steps() -> u32 {
    8
}

/// LLM provider endpoint definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LlmConfig {
    pub provider: String,
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key. Never the key itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Typed component payload, tagged by `type` in the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ComponentSpec {
    Server(ServerConfig),
    Client(ClientConfig),
    Host(HostConfig),
    Agent(AgentConfig),
    Llm(LlmConfig),
}

impl ComponentSpec {
    pub fn kind(&self) -> ComponentType {
        match self {
            ComponentSpec::Server(_) => ComponentType::Server,
            ComponentSpec::Client(_) => ComponentType::Client,
            ComponentSpec::Host(_) => ComponentType::Host,
            ComponentSpec::Agent(_) => ComponentType::Agent,
            ComponentSpec::Llm(_) => ComponentType::Llm,
        }
    }
}

/// A named configuration component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Component {
    pub name: String,
    #[serde(flatten)]
    pub spec: ComponentSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Component {
    pub fn new(name: impl Into<String>, spec: ComponentSpec) -> Self {
        Self {
            name: name.into(),
            spec,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn kind(&self) -> ComponentType {
        self.spec.kind()
    }
}

/// Per-scope root configuration (`root.json`).
///
/// Holds defaults merged beneath every component of the scope. Not
/// addressable through the component CRUD surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RootConfig {
    /// Default LLM for agents that name none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm: Option<String>,
    /// Default request timeout for clients that name none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    /// Log level hint for tooling in this scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Free-form defaults merged beneath components, keyed by type segment
    /// (e.g. "agents", "servers").
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[schema(value_type = Object)]
    pub defaults: BTreeMap<String, serde_json::Value>,
}

/// Validate a component name.
///
/// Names must be non-empty and survive filename sanitization unchanged, so
/// that the on-disk layout is a bijection of (scope, type, name).
pub fn validate_name(name: &str) -> StoreResult<()> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation {
            message: "component name must not be empty".to_string(),
        });
    }
    if sanitize_filename::sanitize(name) != name {
        return Err(StoreError::Validation {
            message: format!("component name '{name}' contains characters not allowed in file names"),
        });
    }
    Ok(())
}
