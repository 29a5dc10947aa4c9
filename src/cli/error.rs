use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error("Failed to connect to API server")]
    #[diagnostic(
        code(mcphost::cli::connection_failed),
        help(
            "Is the API server running? Try: mcph-api\nOr set MCPH_API_URL environment variable to point to the correct server."
        )
    )]
    ConnectionFailed {
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to API server timed out")]
    #[diagnostic(
        code(mcphost::cli::timeout),
        help("The server accepted the connection but did not answer in time.")
    )]
    Timeout {
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid response from API server: {message}")]
    #[diagnostic(
        code(mcphost::cli::invalid_response),
        help(
            "The server returned data in an unexpected format. This might indicate a version mismatch."
        )
    )]
    InvalidResponse { message: String },

    #[error("API error ({status}): {message}")]
    #[diagnostic(code(mcphost::cli::api_error))]
    ApiError { status: u16, message: String },

    #[error("Invalid argument: {message}")]
    #[diagnostic(code(mcphost::cli::invalid_argument))]
    InvalidArgument { message: String },

    #[error("Failed to read {path}: {message}")]
    #[diagnostic(code(mcphost::cli::io))]
    Io { path: String, message: String },
}

impl CliError {
    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CliError::ConnectionFailed { .. } | CliError::Timeout { .. } => true,
            CliError::ApiError { status, .. } => *status == 429 || *status >= 500,
            CliError::InvalidResponse { .. }
            | CliError::InvalidArgument { .. }
            | CliError::Io { .. } => false,
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CliError::Timeout { source: e }
        } else if e.is_connect() {
            CliError::ConnectionFailed { source: e }
        } else {
            CliError::InvalidResponse {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::InvalidResponse {
            message: e.to_string(),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
