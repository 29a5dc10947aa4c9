//! Execution error taxonomy.
//!
//! Failures from agent runs, tool routing, and downstream calls are bucketed
//! so callers can decide retryability and users get a stable message per
//! bucket. The API layer maps these onto HTTP statuses.

use miette::Diagnostic;
use thiserror::Error;

use crate::resolve::ResolveError;

/// Errors from the execution facade and its collaborators.
#[derive(Error, Diagnostic, Debug)]
pub enum ExecError {
    #[error("Network error: {message}")]
    #[diagnostic(code(mcphost::exec::network))]
    Network { message: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(mcphost::exec::auth),
        help("Check the API key environment variable named in the LLM config.")
    )]
    Auth { message: String },

    #[error("Invalid request: {message}")]
    #[diagnostic(code(mcphost::exec::validation))]
    Validation { message: String },

    #[error("Upstream server error ({status}): {message}")]
    #[diagnostic(code(mcphost::exec::server))]
    Server { status: u16, message: String },

    #[error("Request timed out: {message}")]
    #[diagnostic(code(mcphost::exec::timeout))]
    Timeout { message: String },

    #[error("Request was cancelled")]
    #[diagnostic(code(mcphost::exec::cancelled))]
    Cancelled,

    #[error("Rate limited: {message}")]
    #[diagnostic(code(mcphost::exec::rate_limited))]
    RateLimited { message: String },

    #[error("Not found: {message}")]
    #[diagnostic(code(mcphost::exec::not_found))]
    NotFound { message: String },

    #[error("Tool '{tool}' is ambiguous; qualify it as one of: {}", candidates.join(", "))]
    #[diagnostic(
        code(mcphost::exec::ambiguous_tool),
        help("Use the qualified form 'server/tool'.")
    )]
    AmbiguousTool { tool: String, candidates: Vec<String> },

    #[error("Unknown tool '{tool}'")]
    #[diagnostic(code(mcphost::exec::unknown_tool))]
    UnknownTool { tool: String },

    #[error("Server '{server}' uses a transport this host cannot call yet")]
    #[diagnostic(
        code(mcphost::exec::unsupported_transport),
        help("Only http transports are callable; stdio servers are declared-only.")
    )]
    UnsupportedTransport { server: String },

    #[error("Agent stopped after reaching the step limit ({steps})")]
    #[diagnostic(code(mcphost::exec::step_limit))]
    StepLimit { steps: u32 },

    #[error("LLM error: {message}")]
    #[diagnostic(code(mcphost::exec::llm))]
    Llm { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),
}

impl ExecError {
    /// Whether a retry can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ExecError::Network { .. }
            | ExecError::Timeout { .. }
            | ExecError::RateLimited { .. } => true,
            ExecError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Bucket an HTTP status from a downstream call.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => ExecError::Auth { message },
            404 => ExecError::NotFound { message },
            408 => ExecError::Timeout { message },
            400 | 422 => ExecError::Validation { message },
            429 => ExecError::RateLimited { message },
            status => ExecError::Server { status, message },
        }
    }

    /// Stable user-facing message per bucket.
    pub fn user_message(&self) -> String {
        match self {
            ExecError::Network { .. } => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ExecError::Auth { .. } => "Authentication failed. Check your credentials.".to_string(),
            ExecError::Validation { .. } => "The request was invalid.".to_string(),
            ExecError::Server { .. } => {
                "The upstream server had a problem. Try again later.".to_string()
            }
            ExecError::Timeout { .. } => "The request timed out. Try again.".to_string(),
            ExecError::Cancelled => "The request was cancelled.".to_string(),
            ExecError::RateLimited { .. } => {
                "Too many requests. Wait a moment and try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ExecError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ExecError::Timeout {
                message: e.to_string(),
            }
        } else if e.is_connect() || e.is_request() {
            ExecError::Network {
                message: e.to_string(),
            }
        } else if e.is_decode() {
            ExecError::Validation {
                message: format!("unexpected response body: {e}"),
            }
        } else {
            ExecError::Network {
                message: e.to_string(),
            }
        }
    }
}

/// Result type for execution operations.
pub type ExecResult<T> = Result<T, ExecError>;
