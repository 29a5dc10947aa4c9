//! V1 API handlers.

mod chat;
mod components;
mod execution;
mod system;

#[cfg(test)]
mod components_test;
#[cfg(test)]
mod execution_test;

use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

pub use chat::*;
pub use components::*;
pub use execution::*;
pub use system::*;

use crate::execution::ExecError;
use crate::resolve::ResolveError;
use crate::store::StoreError;

/// Error body returned by every endpoint.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) type ApiErr = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error_response(status: StatusCode, error: impl Into<String>) -> ApiErr {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub(crate) fn bad_request(message: impl Into<String>) -> ApiErr {
    error_response(StatusCode::BAD_REQUEST, message)
}

pub(crate) fn store_error(e: StoreError) -> ApiErr {
    let status = match &e {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::AlreadyExists { .. } => StatusCode::CONFLICT,
        StoreError::Validation { .. } => StatusCode::BAD_REQUEST,
        StoreError::Io { .. } | StoreError::Serde { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}

pub(crate) fn resolve_error(e: ResolveError) -> ApiErr {
    match e {
        ResolveError::Store(inner) => store_error(inner),
        ResolveError::DanglingRef { .. } => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        ResolveError::TypeMismatch { .. } | ResolveError::Invalid { .. } => {
            error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}

pub(crate) fn exec_error(e: ExecError) -> ApiErr {
    let status = match &e {
        ExecError::Network { .. } | ExecError::Server { .. } | ExecError::Llm { .. } => {
            StatusCode::BAD_GATEWAY
        }
        ExecError::Auth { .. } => StatusCode::UNAUTHORIZED,
        ExecError::Validation { .. } => StatusCode::BAD_REQUEST,
        ExecError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        ExecError::Cancelled => StatusCode::REQUEST_TIMEOUT,
        ExecError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        ExecError::NotFound { .. } | ExecError::UnknownTool { .. } => StatusCode::NOT_FOUND,
        ExecError::AmbiguousTool { .. } => StatusCode::CONFLICT,
        ExecError::UnsupportedTransport { .. } => StatusCode::NOT_IMPLEMENTED,
        ExecError::StepLimit { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ExecError::Resolve(_) => StatusCode::BAD_REQUEST,
    };
    match e {
        ExecError::Resolve(inner) => resolve_error(inner),
        other => error_response(status, other.to_string()),
    }
}
