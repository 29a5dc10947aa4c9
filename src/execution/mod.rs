//! Agent execution.
//!
//! - `error`: failure taxonomy with retryability
//! - `retry`: exponential-backoff retry loop
//! - `router`: tool-name routing over a resolved agent
//! - `transport`: downstream tool-server calls
//! - `llm`: OpenAI-compatible chat client
//! - `facade`: ties it together into agent runs

mod error;
mod facade;
mod llm;
mod retry;
mod router;
mod transport;


pub use error::{ExecError, ExecResult};
pub use facade::{ExecutionFacade, RunOutcome, ToolCallRecord};
pub use llm::{ChatMessage, ChatRequest, FunctionCall, LlmClient, OpenAiClient, ToolCall};
pub use retry::{backoff_for, retry};
pub use router::{ToolRoute, ToolRouter};
pub use transport::{HttpTransport, ToolTransport};

#[cfg(test)]
pub use llm::MockLlmClient;
#[cfg(test)]
pub use transport::MockToolTransport;
