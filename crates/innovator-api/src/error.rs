//! Error types for innovator-api

use thiserror::Error;

/// Result type alias using innovator-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the idea service
#[derive(Error, Debug)]
pub enum Error {
    /// Request never produced a response (connect failure, timeout, body read)
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-2xx response carrying a structured `detail`
    #[error("{detail}")]
    Service { status: u16, detail: String },

    /// Non-2xx response without a usable `detail`
    #[error("Request failed with status code {status}")]
    Status { status: u16 },

    /// Client could not be built from the given settings
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a service error from a status code and detail message
    pub fn service(status: u16, detail: impl Into<String>) -> Self {
        Self::Service {
            status,
            detail: detail.into(),
        }
    }

    /// The structured detail reported by the service, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Service { detail, .. } => Some(detail),
            _ => None,
        }
    }

    /// HTTP status of the failed response, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Service { status, .. } | Error::Status { status } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether this failed below the service contract (no structured detail)
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Status { .. } | Error::Json(_))
    }
}
