//! Tool routing for a resolved agent.
//!
//! A route maps a tool name to the client/server pair that owns it, after
//! the host's allow/deny filters and the server's own allowlist. Qualified
//! names (`server/tool`) always address one server; unqualified names
//! resolve only when unambiguous. Scope priority applies to configuration,
//! not to tool dispatch — an ambiguous tool name is an error, never a
//! silent first-match.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::execution::error::{ExecError, ExecResult};
use crate::execution::transport::ToolTransport;
use crate::resolve::ResolvedAgent;
use crate::store::HostConfig;

/// One routable tool.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ToolRoute {
    /// Client component owning the connection.
    pub client: String,
    /// Server component the tool lives on.
    pub server: String,
    /// Bare tool name.
    pub tool: String,
}

impl ToolRoute {
    /// Qualified `server/tool` form.
    pub fn qualified(&self) -> String {
        format!("{}/{}", self.server, self.tool)
    }
}

/// Routing table for one resolved agent.
#[derive(Debug, Default)]
pub struct ToolRouter {
    by_name: BTreeMap<String, Vec<ToolRoute>>,
}

impl ToolRouter {
    /// Build the table by asking each server for its tools.
    pub async fn discover<T: ToolTransport + ?Sized>(
        resolved: &ResolvedAgent,
        transport: &T,
    ) -> ExecResult<Self> {
        let mut listings = BTreeMap::new();
        for rc in &resolved.clients {
            let tools = transport.list_tools(&rc.server).await?;
            listings.insert(rc.server_name.clone(), tools);
        }
        Ok(Self::from_listings(resolved, &listings))
    }

    /// Build the table from pre-fetched per-server tool listings.
    pub fn from_listings(
        resolved: &ResolvedAgent,
        listings: &BTreeMap<String, Vec<String>>,
    ) -> Self {
        let mut router = Self::default();
        for rc in &resolved.clients {
            let Some(tools) = listings.get(&rc.server_name) else {
                continue;
            };
            for tool in tools {
                if let Some(allow) = &rc.server.tools
                    && !allow.contains(tool)
                {
                    continue;
                }
                if !permits(&resolved.host, tool) {
                    continue;
                }
                router
                    .by_name
                    .entry(tool.clone())
                    .or_default()
                    .push(ToolRoute {
                        client: rc.name.clone(),
                        server: rc.server_name.clone(),
                        tool: tool.clone(),
                    });
            }
        }
        router
    }

    /// Resolve a tool name, qualified (`server/tool`) or bare.
    pub fn resolve(&self, name: &str) -> ExecResult<&ToolRoute> {
        if let Some((server, tool)) = name.split_once('/') {
            return self
                .by_name
                .get(tool)
                .and_then(|routes| routes.iter().find(|r| r.server == server))
                .ok_or_else(|| ExecError::UnknownTool {
                    tool: name.to_string(),
                });
        }

        match self.by_name.get(name).map(|r| r.as_slice()) {
            None | Some([]) => Err(ExecError::UnknownTool {
                tool: name.to_string(),
            }),
            Some([route]) => Ok(route),
            Some(routes) => Err(ExecError::AmbiguousTool {
                tool: name.to_string(),
                candidates: routes.iter().map(ToolRoute::qualified).collect(),
            }),
        }
    }

    /// All routes, sorted by tool name then server.
    pub fn list(&self) -> Vec<&ToolRoute> {
        self.by_name.values().flatten().collect()
    }

    /// Names to advertise to the LLM: bare where unique, qualified where
    /// several servers expose the same tool.
    pub fn advertised_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for (name, routes) in &self.by_name {
            if routes.len() == 1 {
                names.push(name.clone());
            } else {
                names.extend(routes.iter().map(ToolRoute::qualified));
            }
        }
        names
    }
}

/// Host-level tool filter. Deny wins over allow.
fn permits(host: &HostConfig, tool: &str) -> bool {
    if host.denied_tools.iter().any(|d| d == tool) {
        return false;
    }
    match &host.allowed_tools {
        Some(allow) => allow.iter().any(|a| a == tool),
        None => true,
    }
}
