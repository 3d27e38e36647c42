//! Error types for the NDDF client
//!
//! Every failure of a remote call surfaces here: transport errors from reqwest,
//! non-success HTTP statuses reported by the service, and local config/IO problems.
//! Uses thiserror for ergonomic error handling.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for NDDF client operations
pub type Result<T> = std::result::Result<T, NddfError>;

/// Error type for NDDF client operations
#[derive(Error, Debug)]
pub enum NddfError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// HTTP request errors (connect, send, body decode)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),

    /// Anyhow errors (for more context)
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

impl NddfError {
    /// HTTP status associated with this error, if the server produced one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            NddfError::Api { status, .. } => Some(*status),
            NddfError::Http(e) => e.status(),
            _ => None,
        }
    }

    /// True when the request never got a response (connection refused, DNS, ...)
    pub fn is_network(&self) -> bool {
        matches!(self, NddfError::Http(e) if e.is_connect() || e.is_timeout() || e.is_request())
    }
}
