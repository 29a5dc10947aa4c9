//! Layered configuration and agent execution for MCP hosts.
//!
//! Components (servers, clients, hosts, agents, llms) live in three
//! configuration scopes with project > workspace > user priority. The
//! crate resolves them into runnable agents and exposes the result over
//! REST, MCP, an OpenAI-compatible chat surface, and a CLI.

pub mod api;
pub mod cli;
pub mod execution;
pub mod mcp;
pub mod resolve;
pub mod store;
