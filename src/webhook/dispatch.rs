//! Webhook event dispatch

use crate::store::PaymentStore;
use crate::types::{EventType, PaymentState};
use serde_json::Value;
use std::sync::Arc;

/// Routes verified webhook events to their handlers
///
/// Handlers persist state through the [`PaymentStore`]; store errors are
/// logged and swallowed so a flaky backend never causes the gateway to
/// redeliver an already-verified event.
#[derive(Clone)]
pub struct EventDispatcher {
    store: Arc<dyn PaymentStore>,
}

impl EventDispatcher {
    /// Create a dispatcher persisting through the given store
    pub fn new(store: Arc<dyn PaymentStore>) -> Self {
        Self { store }
    }

    /// Dispatch a recognized event to its handler
    pub async fn dispatch(&self, event: EventType, payload: &Value) {
        match event {
            EventType::CheckoutOrderCompleted
            | EventType::PgOrderCompleted
            | EventType::PaylinkOrderCompleted => self.payment_success(payload).await,
            EventType::CheckoutOrderFailed
            | EventType::PgOrderFailed
            | EventType::PaylinkOrderFailed => self.payment_failure(payload).await,
            EventType::RefundCompleted => self.refund_success(payload).await,
            EventType::RefundFailed => self.refund_state(payload, "FAILED").await,
            EventType::RefundAccepted => self.refund_state(payload, "ACCEPTED").await,
            EventType::SettlementInitiated => self.settlement(payload, "INITIATED").await,
            EventType::SettlementAttemptFailed => self.settlement(payload, "FAILED").await,
            EventType::SubscriptionPaused => self.subscription(payload, "PAUSED").await,
            EventType::SubscriptionCancelled => self.subscription(payload, "CANCELLED").await,
            EventType::SubscriptionRevoked => self.subscription(payload, "REVOKED").await,
            EventType::DisputeCreated => self.dispute(payload, "CREATED").await,
            EventType::DisputeUnderReview => self.dispute(payload, "UNDER_REVIEW").await,
        }
    }

    async fn payment_success(&self, payload: &Value) {
        let Some(merchant_order_id) = str_field(payload, "merchantOrderId") else {
            tracing::warn!("Payment event without merchantOrderId, skipping");
            return;
        };
        let state = str_field(payload, "state").unwrap_or("UNKNOWN");
        let amount = payload.get("amount").and_then(Value::as_i64);
        let payment_mode = payload
            .get("paymentDetails")
            .and_then(|d| d.get(0))
            .and_then(|d| d.get("paymentMode"))
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN");

        tracing::info!(
            "Payment successful: {} amount {:?} via {}",
            merchant_order_id,
            amount,
            payment_mode
        );

        // Only a confirmed COMPLETED state activates anything
        if PaymentState::parse(state) != Some(PaymentState::Completed) {
            tracing::warn!(
                "Success event for {} carries state {}, not persisting",
                merchant_order_id,
                state
            );
            return;
        }

        if let Err(e) = self
            .store
            .update_payment_state(merchant_order_id, PaymentState::Completed, payload)
            .await
        {
            tracing::error!("Failed to persist payment success for {}: {}", merchant_order_id, e);
        }
        if let Err(e) = self
            .store
            .record_event("payment", merchant_order_id, "SUCCESS", payload)
            .await
        {
            tracing::error!("Failed to log payment event for {}: {}", merchant_order_id, e);
        }
    }

    async fn payment_failure(&self, payload: &Value) {
        let Some(merchant_order_id) = str_field(payload, "merchantOrderId") else {
            tracing::warn!("Payment event without merchantOrderId, skipping");
            return;
        };
        let error_code = str_field(payload, "errorCode").unwrap_or("UNKNOWN");
        let error_message = str_field(payload, "errorMessage").unwrap_or("Payment failed");
        tracing::warn!(
            "Payment failed: {} ({} - {})",
            merchant_order_id,
            error_code,
            error_message
        );

        if let Err(e) = self
            .store
            .update_payment_state(merchant_order_id, PaymentState::Failed, payload)
            .await
        {
            tracing::error!("Failed to persist payment failure for {}: {}", merchant_order_id, e);
        }
        if let Err(e) = self
            .store
            .record_event("payment", merchant_order_id, "FAILED", payload)
            .await
        {
            tracing::error!("Failed to log payment event for {}: {}", merchant_order_id, e);
        }
    }

    async fn refund_success(&self, payload: &Value) {
        let Some(merchant_refund_id) = str_field(payload, "merchantRefundId") else {
            tracing::warn!("Refund event without merchantRefundId, skipping");
            return;
        };
        let amount = payload.get("amount").and_then(Value::as_i64);
        tracing::info!("Refund completed: {} amount {:?}", merchant_refund_id, amount);
        if let Err(e) = self.store.complete_refund(merchant_refund_id, payload).await {
            tracing::error!("Failed to complete refund {}: {}", merchant_refund_id, e);
        }
    }

    async fn refund_state(&self, payload: &Value, state: &str) {
        let Some(merchant_refund_id) = str_field(payload, "merchantRefundId") else {
            tracing::warn!("Refund event without merchantRefundId, skipping");
            return;
        };
        tracing::info!("Refund {}: {}", state.to_lowercase(), merchant_refund_id);
        if let Err(e) = self
            .store
            .update_refund_state(merchant_refund_id, state, payload)
            .await
        {
            tracing::error!("Failed to update refund {}: {}", merchant_refund_id, e);
        }
    }

    async fn settlement(&self, payload: &Value, status: &str) {
        let settlement_id = str_field(payload, "settlementId").unwrap_or("UNKNOWN");
        tracing::info!("Settlement {}: {}", status.to_lowercase(), settlement_id);
        if let Err(e) = self
            .store
            .record_event("settlement", settlement_id, status, payload)
            .await
        {
            tracing::error!("Failed to log settlement {}: {}", settlement_id, e);
        }
    }

    async fn subscription(&self, payload: &Value, state: &str) {
        let Some(subscription_id) = str_field(payload, "subscriptionId") else {
            tracing::warn!("Subscription event without subscriptionId, skipping");
            return;
        };
        tracing::info!("Subscription {}: {}", state.to_lowercase(), subscription_id);
        if let Err(e) = self
            .store
            .update_subscription_state(subscription_id, state)
            .await
        {
            tracing::error!("Failed to update subscription {}: {}", subscription_id, e);
        }
    }

    async fn dispute(&self, payload: &Value, status: &str) {
        let dispute_id = str_field(payload, "disputeId").unwrap_or("UNKNOWN");
        tracing::warn!(
            "Payment dispute {}: {} for order {:?}",
            status.to_lowercase(),
            dispute_id,
            str_field(payload, "merchantOrderId")
        );
        if let Err(e) = self
            .store
            .record_event("dispute", dispute_id, status, payload)
            .await
        {
            tracing::error!("Failed to log dispute {}: {}", dispute_id, e);
        }
    }
}

fn str_field<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload.get(key).and_then(Value::as_str)
}
