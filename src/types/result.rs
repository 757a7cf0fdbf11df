//! Structured call results
//!
//! Gateway operations never let errors escape as panics or raw `Err` variants
//! across the module boundary. Every operation returns a [`CallResult`]: the
//! success payload, or a [`CallFailure`] carrying the failure kind, a short
//! message, and the upstream details needed for diagnosis. The HTTP layer maps
//! failure kinds uniformly to status codes.

use crate::GatewayError;
use serde::{Deserialize, Serialize};

/// Result of a gateway operation: a typed success payload or a structured failure
pub type CallResult<T> = std::result::Result<T, CallFailure>;

/// Category of a gateway call failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Bad caller-supplied input, rejected before any network call
    Validation,
    /// Credential exchange failed
    Auth,
    /// The gateway returned a non-2xx response
    Gateway,
    /// Timeout or connection failure
    Network,
}

/// Structured failure data returned by gateway operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFailure {
    /// Always `false`; kept on the wire so callers can branch on one field
    pub success: bool,
    /// Failure category
    pub kind: FailureKind,
    /// Short human-readable error message
    pub error: String,
    /// Raw upstream response body or underlying error text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Upstream HTTP status, when the gateway answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl CallFailure {
    /// Build a validation failure
    pub fn validation(error: impl Into<String>) -> Self {
        Self {
            success: false,
            kind: FailureKind::Validation,
            error: error.into(),
            details: None,
            status_code: None,
        }
    }

    /// Build an auth failure
    pub fn auth(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: false,
            kind: FailureKind::Auth,
            error: error.into(),
            details: Some(details.into()),
            status_code: None,
        }
    }

    /// Build a gateway failure from an upstream status and body
    pub fn gateway(error: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            success: false,
            kind: FailureKind::Gateway,
            error: error.into(),
            details: Some(body.into()),
            status_code: Some(status),
        }
    }

    /// Build a network failure
    pub fn network(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            success: false,
            kind: FailureKind::Network,
            error: error.into(),
            details: Some(details.into()),
            status_code: None,
        }
    }

    /// Convert an internal error into the structured failure shape, with the
    /// operation-specific message the caller sees
    pub fn from_error(error: impl Into<String>, source: &GatewayError) -> Self {
        match source {
            GatewayError::Validation(msg) => Self::validation(msg.clone()),
            GatewayError::Auth(msg) => Self::auth(error, msg.clone()),
            GatewayError::Gateway { status, body } => Self::gateway(error, *status, body.clone()),
            _ => Self::network(error, source.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_serialization() {
        let failure = CallFailure::gateway("Payment order creation failed", 502, "upstream down");
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["kind"], "gateway");
        assert_eq!(json["statusCode"], 502);
        assert_eq!(json["details"], "upstream down");
    }

    #[test]
    fn test_validation_failure_omits_details() {
        let failure = CallFailure::validation("Invalid amount");
        let json = serde_json::to_value(&failure).unwrap();
        assert!(json.get("details").is_none());
        assert!(json.get("statusCode").is_none());
    }

    #[test]
    fn test_from_error_maps_kinds() {
        let auth = GatewayError::auth("exchange returned 401");
        let failure = CallFailure::from_error("Failed to get access token", &auth);
        assert_eq!(failure.kind, FailureKind::Auth);
        assert_eq!(failure.error, "Failed to get access token");
        assert_eq!(failure.details.as_deref(), Some("exchange returned 401"));

        let network = GatewayError::network("timed out");
        let failure = CallFailure::from_error("Status check failed", &network);
        assert_eq!(failure.kind, FailureKind::Network);
    }
}
