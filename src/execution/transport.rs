//! Downstream tool-server transport.
//!
//! The host reaches tool servers through a transport trait so tests can
//! substitute a mock. The HTTP implementation targets the conventional
//! REST surface of downstream servers: `GET {url}/tools` and
//! `POST {url}/tools/{name}/call`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::execution::error::{ExecError, ExecResult};
use crate::store::{ServerConfig, Transport};

/// Transport for listing and calling a server's tools.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Tool names the server advertises.
    async fn list_tools(&self, server: &ServerConfig) -> ExecResult<Vec<String>>;

    /// Invoke one tool with JSON arguments.
    async fn call_tool(&self, server: &ServerConfig, tool: &str, args: Value) -> ExecResult<Value>;
}

#[derive(Deserialize)]
struct ToolInfo {
    name: String,
}

#[derive(Deserialize)]
struct ToolListResponse {
    tools: Vec<ToolInfo>,
}

#[derive(Serialize)]
struct CallRequest {
    arguments: Value,
}

/// HTTP transport over reqwest.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL of an http server, or UnsupportedTransport for stdio.
    fn base_url(server: &ServerConfig) -> ExecResult<&str> {
        match &server.transport {
            Transport::Http { url, .. } => Ok(url.trim_end_matches('/')),
            Transport::Stdio { command, .. } => Err(ExecError::UnsupportedTransport {
                server: command.clone(),
            }),
        }
    }

    fn apply_server_options(
        mut request: reqwest::RequestBuilder,
        server: &ServerConfig,
    ) -> reqwest::RequestBuilder {
        if let Transport::Http { headers, .. } = &server.transport {
            for (name, value) in headers {
                request = request.header(name, value);
            }
        }
        if let Some(timeout_ms) = server.timeout_ms {
            request = request.timeout(Duration::from_millis(timeout_ms));
        }
        request
    }

    async fn check_status(response: reqwest::Response) -> ExecResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(ExecError::from_status(status, body))
    }
}

#[async_trait]
impl ToolTransport for HttpTransport {
    async fn list_tools(&self, server: &ServerConfig) -> ExecResult<Vec<String>> {
        let base = Self::base_url(server)?;
        let request = Self::apply_server_options(self.client.get(format!("{base}/tools")), server);
        let response = Self::check_status(request.send().await?).await?;
        let listing: ToolListResponse = response.json().await?;
        Ok(listing.tools.into_iter().map(|t| t.name).collect())
    }

    async fn call_tool(&self, server: &ServerConfig, tool: &str, args: Value) -> ExecResult<Value> {
        let base = Self::base_url(server)?;
        let request = Self::apply_server_options(
            self.client
                .post(format!("{base}/tools/{tool}/call"))
                .json(&CallRequest { arguments: args }),
            server,
        );
        let response = Self::check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }
}
