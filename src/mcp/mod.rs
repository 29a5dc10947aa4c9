//! Model Context Protocol (MCP) server implementation.
//!
//! Exposes the configuration store and execution facade over the
//! Streamable HTTP transport:
//!
//! - **server**: the `McpServer` handler with one tool per operation
//! - **service**: wraps the handler into an Axum-nestable tower service
//!
//! The server is generic over the same injected backends as the HTTP
//! handlers, with no dynamic dispatch.

pub mod server;
mod service;


pub use server::McpServer;
pub use service::create_mcp_service;
