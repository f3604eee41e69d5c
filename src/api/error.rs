//! Error types for the API layer.

use thiserror::Error;

/// Errors raised while talking to the Dust API.
///
/// The three classified variants carry the verbatim response body so the
/// caller can inspect whatever the server said.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: the API key was rejected.
    #[error("{0}")]
    Authentication(String),

    /// 404: the workspace or resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// 405: the endpoint does not accept the method.
    #[error("{0}")]
    MethodNotAllowed(String),

    /// Transport failure (DNS, TLS, timeout, reset connection).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON did not have the shape of the expected entity.
    #[error("failed to decode {entity}: {source}")]
    Decode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A response envelope lacked the field holding the payload.
    #[error("response is missing the `{0}` field")]
    MissingField(&'static str),
}

impl ApiError {
    /// The upstream body for classified errors.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            ApiError::Authentication(body)
            | ApiError::NotFound(body)
            | ApiError::MethodNotAllowed(body) => Some(body),
            _ => None,
        }
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Authentication(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
