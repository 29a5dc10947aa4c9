//! Resolution error types.

use miette::Diagnostic;
use thiserror::Error;

use crate::store::StoreError;

/// Errors from configuration resolution.
#[derive(Error, Diagnostic, Debug)]
pub enum ResolveError {
    #[error("Dangling reference: {kind} '{name}' referenced by {referenced_by} does not exist")]
    #[diagnostic(
        code(mcphost::resolve::dangling_ref),
        help("Create the missing component, or fix the reference.")
    )]
    DanglingRef {
        kind: String,
        name: String,
        referenced_by: String,
    },

    #[error("Type mismatch resolving '{name}': expected {expected}, found {found}")]
    #[diagnostic(code(mcphost::resolve::type_mismatch))]
    TypeMismatch {
        name: String,
        expected: String,
        found: String,
    },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(mcphost::resolve::invalid))]
    Invalid { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Result type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
