//! Store error types.
//!
//! Abstracted error types for configuration-store operations. Uses miette
//! for fancy diagnostic output and thiserror for derive macros. The error
//! types are backend agnostic.

use miette::Diagnostic;
use thiserror::Error;

/// Configuration store errors.
#[derive(Error, Diagnostic, Debug)]
pub enum StoreError {
    #[error("Component not found: {kind} '{name}'")]
    #[diagnostic(code(mcphost::store::not_found))]
    NotFound { kind: String, name: String },

    #[error("Component already exists: {kind} '{name}' in scope {scope}")]
    #[diagnostic(code(mcphost::store::already_exists))]
    AlreadyExists {
        kind: String,
        name: String,
        scope: String,
    },

    #[error("Validation error: {message}")]
    #[diagnostic(code(mcphost::store::validation))]
    Validation { message: String },

    #[error("I/O error at {path}: {message}")]
    #[diagnostic(code(mcphost::store::io))]
    Io { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    #[diagnostic(
        code(mcphost::store::parse),
        help("Component files must be valid JSON (or YAML with a .yaml/.yml extension).")
    )]
    Serde { path: String, message: String },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
