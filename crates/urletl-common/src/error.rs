//! Error types for the URL pipeline
//!
//! Every stage aborts the run on the first error it returns. The per-record
//! transform rules never produce one of these.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum EtlError {
    /// A connection parameter is absent or unusable
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Configuration(String),

    /// The API answered with a non-success status, or could not be reached
    #[error("Request failed{}: {message}", status_suffix(.status))]
    Request {
        status: Option<u16>,
        message: String,
    },

    /// The API body is not valid JSON
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The document store could not be reached or rejected the insert
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EtlError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a request error for a non-success HTTP status
    pub fn request_status(status: u16, msg: impl Into<String>) -> Self {
        Self::Request {
            status: Some(status),
            message: msg.into(),
        }
    }

    /// Create a request error for a transport failure
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request {
            status: None,
            message: msg.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a persistence error
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// HTTP status carried by a request error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => *status,
            _ => None,
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status
        .map(|code| format!(" with status {code}"))
        .unwrap_or_default()
}
