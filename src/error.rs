//! Error handling for the gateway integration
//!
//! [`GatewayError`] is the internal error taxonomy. Public client operations do
//! not surface it directly: they convert failures into structured
//! [`CallFailure`](crate::types::CallFailure) results so the HTTP layer can map
//! them uniformly to status codes.

use thiserror::Error;

/// Result type alias using [`GatewayError`]
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Error taxonomy for gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing or invalid configuration at construction time. Fatal to startup,
    /// never recoverable per-call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad caller-supplied input, rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Credential exchange with the authorization endpoint failed
    #[error("Authorization failed: {0}")]
    Auth(String),

    /// The gateway returned a non-2xx response
    #[error("Gateway returned {status}: {body}")]
    Gateway {
        /// Upstream HTTP status code
        status: u16,
        /// Raw upstream response body for caller diagnosis
        body: String,
    },

    /// Timeout or connection failure
    #[error("Network error: {0}")]
    Network(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GatewayError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an authorization error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Create a gateway error from an upstream status and body
    pub fn gateway(status: u16, body: impl Into<String>) -> Self {
        Self::Gateway {
            status,
            body: body.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts and connection failures are the caller-visible Network
        // category; anything else from the client stack is reported the same
        // way since no response was received.
        if err.is_timeout() {
            Self::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            Self::Network(format!("Connection failed: {}", err))
        } else {
            Self::Network(err.to_string())
        }
    }
}
