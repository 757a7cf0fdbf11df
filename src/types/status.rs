//! Payment status types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Normalized payment state
///
/// The gateway reports state as a string inside the status payload; transitions
/// are driven entirely by what the gateway reports, never computed locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    /// Payment not yet concluded
    Pending,
    /// Payment collected successfully
    Completed,
    /// Payment failed or was abandoned
    Failed,
}

impl PaymentState {
    /// Parse a gateway-reported state string; unknown states map to `None`
    pub fn parse(state: &str) -> Option<Self> {
        match state {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        };
        f.write_str(s)
    }
}

/// Successful status check result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSuccess {
    /// Always `true`
    pub success: bool,
    /// Order the status was checked for
    pub merchant_order_id: String,
    /// Normalized state extracted from the gateway payload
    pub state: Option<String>,
    /// Amount in minor units as reported by the gateway
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    /// Per-attempt payment details reported by the gateway
    pub payment_details: Value,
    /// Raw gateway status response, passed through for the caller
    pub status_data: Value,
}

impl StatusSuccess {
    /// Build a success result from the raw gateway status payload
    pub fn from_gateway(merchant_order_id: impl Into<String>, status_data: Value) -> Self {
        let payload = status_data.get("payload").cloned().unwrap_or(Value::Null);
        let state = payload
            .get("state")
            .and_then(Value::as_str)
            .map(str::to_string);
        let amount = payload.get("amount").and_then(Value::as_i64);
        let payment_details = payload
            .get("paymentDetails")
            .cloned()
            .unwrap_or_else(|| Value::Array(vec![]));

        Self {
            success: true,
            merchant_order_id: merchant_order_id.into(),
            state,
            amount,
            payment_details,
            status_data,
        }
    }
}
