//! Webhook event types

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Inbound webhook body: `{event, payload, timestamp?}`
///
/// The envelope is transient; it exists only for the duration of one dispatch
/// and is not retained by any component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEnvelope {
    /// Event type string, e.g. `checkout.order.completed`
    pub event: String,
    /// Opaque event payload forwarded to the handler
    #[serde(default)]
    pub payload: Value,
    /// Delivery timestamp, epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

/// Recognized webhook event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// `checkout.order.completed`
    CheckoutOrderCompleted,
    /// `checkout.order.failed`
    CheckoutOrderFailed,
    /// `pg.order.completed`
    PgOrderCompleted,
    /// `pg.order.failed`
    PgOrderFailed,
    /// `pg.refund.completed`
    RefundCompleted,
    /// `pg.refund.failed`
    RefundFailed,
    /// `pg.refund.accepted`
    RefundAccepted,
    /// `settlement.initiated`
    SettlementInitiated,
    /// `settlement.attempt.failed`
    SettlementAttemptFailed,
    /// `subscription.paused`
    SubscriptionPaused,
    /// `subscription.cancelled`
    SubscriptionCancelled,
    /// `subscription.revoked`
    SubscriptionRevoked,
    /// `payment.dispute.created`
    DisputeCreated,
    /// `payment.dispute.under_review`
    DisputeUnderReview,
    /// `paylink.order.completed`
    PaylinkOrderCompleted,
    /// `paylink.order.failed`
    PaylinkOrderFailed,
}

impl EventType {
    /// All recognized event types
    pub const ALL: [EventType; 16] = [
        Self::CheckoutOrderCompleted,
        Self::CheckoutOrderFailed,
        Self::PgOrderCompleted,
        Self::PgOrderFailed,
        Self::RefundCompleted,
        Self::RefundFailed,
        Self::RefundAccepted,
        Self::SettlementInitiated,
        Self::SettlementAttemptFailed,
        Self::SubscriptionPaused,
        Self::SubscriptionCancelled,
        Self::SubscriptionRevoked,
        Self::DisputeCreated,
        Self::DisputeUnderReview,
        Self::PaylinkOrderCompleted,
        Self::PaylinkOrderFailed,
    ];

    /// Parse an event type string; unrecognized types map to `None`
    pub fn parse(event: &str) -> Option<Self> {
        match event {
            "checkout.order.completed" => Some(Self::CheckoutOrderCompleted),
            "checkout.order.failed" => Some(Self::CheckoutOrderFailed),
            "pg.order.completed" => Some(Self::PgOrderCompleted),
            "pg.order.failed" => Some(Self::PgOrderFailed),
            "pg.refund.completed" => Some(Self::RefundCompleted),
            "pg.refund.failed" => Some(Self::RefundFailed),
            "pg.refund.accepted" => Some(Self::RefundAccepted),
            "settlement.initiated" => Some(Self::SettlementInitiated),
            "settlement.attempt.failed" => Some(Self::SettlementAttemptFailed),
            "subscription.paused" => Some(Self::SubscriptionPaused),
            "subscription.cancelled" => Some(Self::SubscriptionCancelled),
            "subscription.revoked" => Some(Self::SubscriptionRevoked),
            "payment.dispute.created" => Some(Self::DisputeCreated),
            "payment.dispute.under_review" => Some(Self::DisputeUnderReview),
            "paylink.order.completed" => Some(Self::PaylinkOrderCompleted),
            "paylink.order.failed" => Some(Self::PaylinkOrderFailed),
            _ => None,
        }
    }

    /// The wire string for this event type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutOrderCompleted => "checkout.order.completed",
            Self::CheckoutOrderFailed => "checkout.order.failed",
            Self::PgOrderCompleted => "pg.order.completed",
            Self::PgOrderFailed => "pg.order.failed",
            Self::RefundCompleted => "pg.refund.completed",
            Self::RefundFailed => "pg.refund.failed",
            Self::RefundAccepted => "pg.refund.accepted",
            Self::SettlementInitiated => "settlement.initiated",
            Self::SettlementAttemptFailed => "settlement.attempt.failed",
            Self::SubscriptionPaused => "subscription.paused",
            Self::SubscriptionCancelled => "subscription.cancelled",
            Self::SubscriptionRevoked => "subscription.revoked",
            Self::DisputeCreated => "payment.dispute.created",
            Self::DisputeUnderReview => "payment.dispute.under_review",
            Self::PaylinkOrderCompleted => "paylink.order.completed",
            Self::PaylinkOrderFailed => "paylink.order.failed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acknowledgment returned to the gateway after a verified delivery
///
/// Returned with HTTP 200 regardless of downstream handler outcome, so the
/// gateway does not retry the delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    /// Always `"success"`
    pub status: String,
    /// Human-readable summary
    pub message: String,
    /// Event type string from the delivery
    pub event: String,
    /// Delivery timestamp (from the envelope, or receipt time)
    pub timestamp: i64,
}

impl WebhookAck {
    /// Build the acknowledgment for a processed delivery
    pub fn processed(event: impl Into<String>, timestamp: Option<i64>) -> Self {
        Self {
            status: "success".to_string(),
            message: "Webhook processed".to_string(),
            event: event.into(),
            timestamp: timestamp.unwrap_or_else(|| Utc::now().timestamp()),
        }
    }
}
