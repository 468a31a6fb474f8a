//! Error types for the bookshelf gateway

use thiserror::Error;

/// Errors that can occur when talking to the bookshelf backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// No session has been established with the auth provider yet
    #[error("Authentication session not initialized")]
    AuthNotInitialized,

    /// The token source failed to produce a token
    #[error("Failed to obtain access token: {0}")]
    Token(String),

    /// Network or transport failure
    #[error("Request failed: {0}")]
    Transport(String),

    /// Backend answered 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend answered 409
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Backend answered another non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The configured base URL is not an http(s) URL
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl GatewayError {
    /// Whether the backend reported the record as absent
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the backend rejected the call as conflicting with its state
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}
