//! Execution facade: resolve, route, run.
//!
//! Generic over store, transport, and LLM client so tests can substitute
//! mocks without dynamic dispatch.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::execution::error::{ExecError, ExecResult};
use crate::execution::llm::{ChatMessage, ChatRequest, LlmClient};
use crate::execution::retry::retry;
use crate::execution::router::{ToolRoute, ToolRouter};
use crate::execution::transport::ToolTransport;
use crate::resolve::{ResolvedAgent, ResolvedClient, Resolver};
use crate::store::ConfigStore;

/// One tool invocation made during a run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ToolCallRecord {
    pub tool: String,
    pub server: String,
    #[schema(value_type = Object)]
    pub arguments: Value,
    #[schema(value_type = Object)]
    pub result: Value,
}

/// Result of an agent run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RunOutcome {
    /// Final assistant reply.
    pub reply: String,
    /// LLM round trips used, including the final one.
    pub steps: u32,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Agent execution facade.
pub struct ExecutionFacade<S: ConfigStore, T: ToolTransport, L: LlmClient> {
    resolver: Resolver<S>,
    transport: Arc<T>,
    llm: Arc<L>,
}

impl<S: ConfigStore, T: ToolTransport, L: LlmClient> Clone for ExecutionFacade<S, T, L> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            transport: Arc::clone(&self.transport),
            llm: Arc::clone(&self.llm),
        }
    }
}

impl<S: ConfigStore, T: ToolTransport, L: LlmClient> ExecutionFacade<S, T, L> {
    pub fn new(store: Arc<S>, transport: Arc<T>, llm: Arc<L>) -> Self {
        Self {
            resolver: Resolver::new(store),
            transport,
            llm,
        }
    }

    pub fn resolver(&self) -> &Resolver<S> {
        &self.resolver
    }

    /// Routable tools of an agent, after all filters.
    pub async fn agent_tools(&self, agent: &str) -> ExecResult<Vec<ToolRoute>> {
        let resolved = self.resolver.resolve_agent(agent).await?;
        let router = ToolRouter::discover(&resolved, self.transport.as_ref()).await?;
        Ok(router.list().into_iter().cloned().collect())
    }

    /// Call one tool through an agent's routing table.
    pub async fn call_tool(&self, agent: &str, tool: &str, args: Value) -> ExecResult<Value> {
        let resolved = self.resolver.resolve_agent(agent).await?;
        let router = ToolRouter::discover(&resolved, self.transport.as_ref()).await?;
        let route = router.resolve(tool)?;
        let rc = Self::owning_client(&resolved, route)?;
        debug!(agent, tool = %route.tool, server = %route.server, "dispatching tool call");
        self.dispatch(rc, route, args).await
    }

    /// Run an agent: resolve its chain, then loop LLM turns and tool calls
    /// until a content-only reply or the step limit.
    pub async fn run_agent(
        &self,
        agent: &str,
        input: &str,
        max_steps_override: Option<u32>,
    ) -> ExecResult<RunOutcome> {
        let resolved = self.resolver.resolve_agent(agent).await?;
        let router = ToolRouter::discover(&resolved, self.transport.as_ref()).await?;
        let advertised = router.advertised_names();
        let max_steps = max_steps_override.unwrap_or(resolved.agent.max_steps);

        let mut messages = Vec::new();
        if let Some(prompt) = &resolved.agent.system_prompt {
            messages.push(ChatMessage::system(prompt));
        }
        messages.push(ChatMessage::user(input));

        let mut records = Vec::new();
        for step in 1..=max_steps {
            let reply = self
                .llm
                .chat(
                    &resolved.llm,
                    ChatRequest {
                        messages: messages.clone(),
                        tools: advertised.clone(),
                    },
                )
                .await?;

            if reply.tool_calls.is_empty() {
                info!(agent, steps = step, tool_calls = records.len(), "agent run finished");
                return Ok(RunOutcome {
                    reply: reply.content.unwrap_or_default(),
                    steps: step,
                    tool_calls: records,
                });
            }

            let tool_calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in &tool_calls {
                let route = router.resolve(&call.function.name)?;
                let args: Value =
                    serde_json::from_str(&call.function.arguments).unwrap_or(Value::Null);
                let rc = Self::owning_client(&resolved, route)?;
                let result = self.dispatch(rc, route, args.clone()).await?;
                messages.push(ChatMessage::tool_result(&call.id, result.to_string()));
                records.push(ToolCallRecord {
                    tool: route.tool.clone(),
                    server: route.server.clone(),
                    arguments: args,
                    result,
                });
            }
        }

        Err(ExecError::StepLimit { steps: max_steps })
    }

    /// Call through the transport with the owning client's timeout and
    /// retry policy. The timeout applies to each attempt separately.
    async fn dispatch(
        &self,
        rc: &ResolvedClient,
        route: &ToolRoute,
        args: Value,
    ) -> ExecResult<Value> {
        let limit = rc.client.request_timeout_ms.map(Duration::from_millis);
        retry(&rc.client.retry, |_| async {
            let call = self.transport.call_tool(&rc.server, &route.tool, args.clone());
            match limit {
                Some(limit) => match tokio::time::timeout(limit, call).await {
                    Ok(result) => result,
                    Err(_) => Err(ExecError::Timeout {
                        message: format!(
                            "tool call exceeded the client timeout of {}ms",
                            limit.as_millis()
                        ),
                    }),
                },
                None => call.await,
            }
        })
        .await
    }

    fn owning_client<'a>(
        resolved: &'a ResolvedAgent,
        route: &ToolRoute,
    ) -> ExecResult<&'a ResolvedClient> {
        resolved
            .clients
            .iter()
            .find(|c| c.name == route.client)
            .ok_or_else(|| ExecError::UnknownTool {
                tool: route.qualified(),
            })
    }
}
