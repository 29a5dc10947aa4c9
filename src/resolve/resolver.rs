//! Cross-scope component resolution and the agent inheritance chain.
//!
//! Resolution happens in two steps:
//!
//! 1. **Scope layering** — same-named components are merged across scopes
//!    lowest priority first (user, workspace, project), after each scope's
//!    root defaults are merged beneath that scope's fragment. The result
//!    is "current context wins" at the granularity of individual keys.
//! 2. **Inheritance chain** — `resolve_agent` walks
//!    agent → host → clients → servers (plus the agent's LLM), producing a
//!    fully dereferenced view. References go strictly downward, so the
//!    chain is acyclic by construction.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use utoipa::ToSchema;

use crate::resolve::error::{ResolveError, ResolveResult};
use crate::resolve::merge::merge_values;
use crate::store::{
    AgentConfig, ClientConfig, Component, ComponentSpec, ComponentType, ConfigStore, HostConfig,
    LlmConfig, Scope, ServerConfig, StoreError,
};

/// One resolved client/server pair of an agent's host.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResolvedClient {
    pub name: String,
    pub client: ClientConfig,
    pub server_name: String,
    pub server: ServerConfig,
}

/// Fully dereferenced view of an agent.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ResolvedAgent {
    pub name: String,
    pub agent: AgentConfig,
    pub llm_name: String,
    pub llm: LlmConfig,
    pub host_name: String,
    pub host: HostConfig,
    /// Enabled clients in host declaration order. Disabled servers are
    /// dropped here.
    pub clients: Vec<ResolvedClient>,
}

/// Configuration resolver over a [`ConfigStore`].
pub struct Resolver<S: ConfigStore> {
    store: Arc<S>,
}

impl<S: ConfigStore> Clone for Resolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ConfigStore> Resolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Resolve a component across scopes.
    ///
    /// Missing in every scope yields the store's NotFound error.
    pub async fn resolve_component(
        &self,
        kind: ComponentType,
        name: &str,
    ) -> ResolveResult<Component> {
        let mut merged: Option<Value> = None;

        for scope in Scope::iter_by_merge_order() {
            let component = match self.store.get_in_scope(scope, kind, name).await {
                Ok(c) => c,
                Err(StoreError::NotFound { .. }) => continue,
                Err(e) => return Err(e.into()),
            };
            let mut fragment =
                serde_json::to_value(&component).map_err(|e| ResolveError::Invalid {
                    message: e.to_string(),
                })?;

            let root = self.store.root_config(scope).await?;
            if let Some(defaults) = root.defaults.get(kind.segment()) {
                fragment = merge_values(defaults.clone(), fragment);
            }

            merged = Some(match merged {
                Some(acc) => merge_values(acc, fragment),
                None => fragment,
            });
        }

        let value = merged.ok_or_else(|| StoreError::NotFound {
            kind: kind.to_string(),
            name: name.to_string(),
        })?;

        if let Some(found) = value.get("type").and_then(|v| v.as_str())
            && found != kind.to_string()
        {
            return Err(ResolveError::TypeMismatch {
                name: name.to_string(),
                expected: kind.to_string(),
                found: found.to_string(),
            });
        }

        serde_json::from_value(value).map_err(|e| ResolveError::Invalid {
            message: format!("resolved {kind} '{name}' is not a valid component: {e}"),
        })
    }

    /// Resolve an agent's full inheritance chain.
    pub async fn resolve_agent(&self, name: &str) -> ResolveResult<ResolvedAgent> {
        let agent_component = self.resolve_component(ComponentType::Agent, name).await?;
        let ComponentSpec::Agent(agent) = agent_component.spec else {
            return Err(ResolveError::Invalid {
                message: format!("component '{name}' is not an agent"),
            });
        };

        let llm_name = match &agent.llm {
            Some(llm) => llm.clone(),
            None => self
                .scope_default(|root| root.llm.clone())
                .await?
                .ok_or_else(|| ResolveError::Invalid {
                    message: format!(
                        "agent '{name}' names no llm and no scope root declares a default"
                    ),
                })?,
        };

        let referenced_by = format!("agent '{name}'");
        let llm_component = self
            .resolve_ref(ComponentType::Llm, &llm_name, &referenced_by)
            .await?;
        let ComponentSpec::Llm(llm) = llm_component.spec else {
            return Err(ResolveError::Invalid {
                message: format!("component '{llm_name}' is not an llm"),
            });
        };

        let host_component = self
            .resolve_ref(ComponentType::Host, &agent.host, &referenced_by)
            .await?;
        let ComponentSpec::Host(host) = host_component.spec else {
            return Err(ResolveError::Invalid {
                message: format!("component '{}' is not a host", agent.host),
            });
        };

        let mut seen = HashSet::new();
        for client_name in &host.clients {
            if !seen.insert(client_name.as_str()) {
                return Err(ResolveError::Invalid {
                    message: format!(
                        "host '{}' lists client '{client_name}' more than once",
                        agent.host
                    ),
                });
            }
        }

        let default_timeout = self
            .scope_default(|root| root.request_timeout_ms)
            .await?;

        let mut clients = Vec::with_capacity(host.clients.len());
        for client_name in &host.clients {
            let host_ref = format!("host '{}'", agent.host);
            let client_component = self
                .resolve_ref(ComponentType::Client, client_name, &host_ref)
                .await?;
            let ComponentSpec::Client(mut client) = client_component.spec else {
                return Err(ResolveError::Invalid {
                    message: format!("component '{client_name}' is not a client"),
                });
            };
            if client.request_timeout_ms.is_none() {
                client.request_timeout_ms = default_timeout;
            }

            let client_ref = format!("client '{client_name}'");
            let server_component = self
                .resolve_ref(ComponentType::Server, &client.server, &client_ref)
                .await?;
            let ComponentSpec::Server(server) = server_component.spec else {
                return Err(ResolveError::Invalid {
                    message: format!("component '{}' is not a server", client.server),
                });
            };

            if !server.enabled {
                debug!(agent = %name, client = %client_name, server = %client.server,
                    "dropping disabled server from resolved agent");
                continue;
            }

            clients.push(ResolvedClient {
                name: client_name.clone(),
                server_name: client.server.clone(),
                client,
                server,
            });
        }

        Ok(ResolvedAgent {
            name: name.to_string(),
            host_name: agent.host.clone(),
            agent,
            llm_name,
            llm,
            host,
            clients,
        })
    }

    /// Resolve a referenced component, turning NotFound into DanglingRef.
    async fn resolve_ref(
        &self,
        kind: ComponentType,
        name: &str,
        referenced_by: &str,
    ) -> ResolveResult<Component> {
        self.resolve_component(kind, name).await.map_err(|e| match e {
            ResolveError::Store(StoreError::NotFound { .. }) => ResolveError::DanglingRef {
                kind: kind.to_string(),
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            },
            other => other,
        })
    }

    /// First root-config value found in scope priority order.
    async fn scope_default<T>(
        &self,
        pick: impl Fn(&crate::store::RootConfig) -> Option<T>,
    ) -> ResolveResult<Option<T>> {
        for scope in Scope::iter_by_priority() {
            let root = self.store.root_config(scope).await?;
            if let Some(value) = pick(&root) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
