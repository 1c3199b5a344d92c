use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use miette::Diagnostic;
use thiserror::Error;
use tracing::error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(graph_tutorial::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(graph_tutorial::config))]
    Config(String),

    #[error("Identity platform error: {0}")]
    #[diagnostic(code(graph_tutorial::identity))]
    Identity(String),

    /// The session holds no usable token; the user has to sign in again
    #[error("Authentication required: {0}")]
    #[diagnostic(code(graph_tutorial::auth_required))]
    AuthRequired(String),

    #[error("Microsoft Graph error: {0}")]
    #[diagnostic(code(graph_tutorial::graph))]
    Graph(String),

    #[error("Session store error: {0}")]
    #[diagnostic(code(graph_tutorial::session))]
    Session(String),

    #[error("Template error: {0}")]
    #[diagnostic(code(graph_tutorial::template))]
    Template(#[from] askama::Error),

    #[error(transparent)]
    #[diagnostic(code(graph_tutorial::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(graph_tutorial::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(graph_tutorial::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Errors that reach the web layer end the request with a 500 page.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Internal server error</h1><p>The request could not be completed.</p>"),
        )
            .into_response()
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create identity platform errors
pub fn identity_error(message: &str) -> Error {
    Error::Identity(message.to_string())
}

/// Helper to create Microsoft Graph errors
pub fn graph_error(message: &str) -> Error {
    Error::Graph(message.to_string())
}

/// Helper to create session store errors
pub fn session_error(message: &str) -> Error {
    Error::Session(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
