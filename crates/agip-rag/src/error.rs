//! Error types for the assistant

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, Error>;

/// Assistant errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or blank API credential
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// Knowledge index missing, unreadable or corrupt
    #[error("Knowledge index error at '{path}': {message}")]
    Index { path: String, message: String },

    /// Query vector does not match the index dimension
    #[error("Embedding dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// LLM error
    #[error("LLM error: {0}")]
    Llm(String),

    /// LLM answered with a non-success status
    #[error("LLM request rejected: HTTP {status} - {message}")]
    LlmStatus { status: u16, message: String },

    /// Malformed request from a caller
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Unknown chat session
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Config file syntax error
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an index error for the given location
    pub fn index(path: impl AsRef<std::path::Path>, message: impl Into<String>) -> Self {
        Self::Index {
            path: path.as_ref().display().to_string(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether retrying the same request cannot succeed until the deployment is fixed
    pub fn is_configuration(&self) -> bool {
        match self {
            Error::Config(_)
            | Error::MissingCredential(_)
            | Error::Index { .. }
            | Error::DimensionMismatch { .. } => true,
            Error::LlmStatus { status, .. } => matches!(status, 401 | 403 | 404),
            _ => false,
        }
    }

    /// Display of this error followed by each underlying cause, `": "` separated.
    /// Causes already quoted in the text are skipped.
    pub fn chain(&self) -> String {
        let mut chain = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !chain.contains(&text) {
                chain.push_str(": ");
                chain.push_str(&text);
            }
            source = cause.source();
        }
        chain
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Error::Config(_) | Error::MissingCredential(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error")
            }
            Error::Index { .. } | Error::DimensionMismatch { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "index_error")
            }
            Error::FileParse { .. } => (StatusCode::BAD_REQUEST, "parse_error"),
            Error::Embedding(_) => (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error"),
            Error::Llm(_) | Error::LlmStatus { .. } => (StatusCode::SERVICE_UNAVAILABLE, "llm_error"),
            Error::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            Error::SessionNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Toml(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
