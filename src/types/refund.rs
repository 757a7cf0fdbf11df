//! Refund types

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request body for initiating a refund
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    /// Merchant order id of the original payment
    pub merchant_order_id: String,
    /// Refund amount in major currency units
    pub amount: Decimal,
    /// Free-form refund reason
    pub reason: String,
}

/// Successful refund initiation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundSuccess {
    /// Always `true`
    pub success: bool,
    /// Generated merchant refund id
    pub merchant_refund_id: String,
    /// Gateway-assigned refund id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_id: Option<String>,
    /// Refund state reported by the gateway
    pub state: String,
    /// Refund amount in minor units
    pub amount: i64,
    /// Refund reason as submitted
    pub reason: String,
}

/// Refund endpoint response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    /// Gateway-assigned refund id
    pub refund_id: Option<String>,
    /// Initial refund state; absent defaults to `PENDING`
    pub state: Option<String>,
}
