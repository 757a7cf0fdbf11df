//! Persistence collaborator for payment and subscription records
//!
//! The webhook dispatcher and the HTTP layer persist payment state through the
//! [`PaymentStore`] trait, keeping the storage backend swappable:
//! [`InMemoryStore`] backs tests and development, [`RestStore`] speaks a
//! Supabase-style REST API (`/rest/v1/<table>` with `col=eq.<val>` filters and
//! service-key authentication).

use crate::types::{OrderSuccess, PaymentState};
use crate::{GatewayError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use tokio::sync::RwLock;

/// A payment order as persisted after successful creation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// User the order belongs to
    pub user_id: String,
    /// Merchant order id correlating with the gateway
    pub merchant_order_id: String,
    /// Amount charged, in minor units
    pub amount_minor_units: i64,
    /// Caller-supplied amount in major units, serialized as a string
    pub base_amount: String,
    /// Tax portion in major units
    pub tax_amount: String,
    /// Subscription plan id
    pub plan_id: String,
    /// Plan display name
    pub plan_name: String,
    /// Checkout session expiry reported by the gateway
    pub expires_at: Option<i64>,
}

impl From<&OrderSuccess> for OrderRecord {
    fn from(order: &OrderSuccess) -> Self {
        Self {
            user_id: order.user_id.clone(),
            merchant_order_id: order.merchant_order_id.clone(),
            amount_minor_units: order.amount,
            base_amount: order.pricing.base_amount.to_string(),
            tax_amount: order.pricing.tax_amount.to_string(),
            plan_id: order.plan_id.clone(),
            plan_name: order.plan_name.clone(),
            expires_at: order.expires_at,
        }
    }
}

/// Trait for persisting payment, refund, and subscription state
///
/// Implementations must be safe to call concurrently. Callers in the webhook
/// path treat errors as non-fatal: they are logged, never propagated back to
/// the gateway.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persist a newly created payment order in `pending` state
    async fn record_order(&self, order: &OrderRecord) -> Result<()>;

    /// Update a payment's state from an externally-reported gateway state
    async fn update_payment_state(
        &self,
        merchant_order_id: &str,
        state: PaymentState,
        details: &Value,
    ) -> Result<()>;

    /// Mark a refund completed
    async fn complete_refund(&self, merchant_refund_id: &str, payload: &Value) -> Result<()>;

    /// Update a refund's state
    async fn update_refund_state(
        &self,
        merchant_refund_id: &str,
        state: &str,
        payload: &Value,
    ) -> Result<()>;

    /// Update a subscription's state
    async fn update_subscription_state(&self, subscription_id: &str, state: &str) -> Result<()>;

    /// Append an audit-trail event (settlements, disputes)
    async fn record_event(
        &self,
        category: &str,
        reference: &str,
        status: &str,
        payload: &Value,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
struct PaymentEntry {
    order: Option<OrderRecord>,
    state: String,
    update_count: u32,
}

/// In-memory store implementation
///
/// Default backend for tests and development; data is lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    payments: RwLock<HashMap<String, PaymentEntry>>,
    refunds: RwLock<HashMap<String, String>>,
    subscriptions: RwLock<HashMap<String, String>>,
    events: RwLock<Vec<Value>>,
}

impl InMemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state of a payment, if recorded
    pub async fn payment_state(&self, merchant_order_id: &str) -> Option<String> {
        let payments = self.payments.read().await;
        payments.get(merchant_order_id).map(|e| e.state.clone())
    }

    /// The order record as persisted at creation time, if any
    pub async fn recorded_order(&self, merchant_order_id: &str) -> Option<OrderRecord> {
        let payments = self.payments.read().await;
        payments.get(merchant_order_id).and_then(|e| e.order.clone())
    }

    /// Number of state updates applied to a payment
    pub async fn payment_update_count(&self, merchant_order_id: &str) -> u32 {
        let payments = self.payments.read().await;
        payments
            .get(merchant_order_id)
            .map(|e| e.update_count)
            .unwrap_or(0)
    }

    /// Current state of a refund, if recorded
    pub async fn refund_state(&self, merchant_refund_id: &str) -> Option<String> {
        let refunds = self.refunds.read().await;
        refunds.get(merchant_refund_id).cloned()
    }

    /// Current state of a subscription, if recorded
    pub async fn subscription_state(&self, subscription_id: &str) -> Option<String> {
        let subscriptions = self.subscriptions.read().await;
        subscriptions.get(subscription_id).cloned()
    }

    /// Number of audit-trail events recorded
    pub async fn event_count(&self) -> usize {
        let events = self.events.read().await;
        events.len()
    }
}

#[async_trait]
impl PaymentStore for InMemoryStore {
    async fn record_order(&self, order: &OrderRecord) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(
            order.merchant_order_id.clone(),
            PaymentEntry {
                order: Some(order.clone()),
                state: "pending".to_string(),
                update_count: 0,
            },
        );
        Ok(())
    }

    async fn update_payment_state(
        &self,
        merchant_order_id: &str,
        state: PaymentState,
        _details: &Value,
    ) -> Result<()> {
        let mut payments = self.payments.write().await;
        let entry = payments.entry(merchant_order_id.to_string()).or_default();
        entry.state = state.to_string().to_lowercase();
        entry.update_count += 1;
        Ok(())
    }

    async fn complete_refund(&self, merchant_refund_id: &str, _payload: &Value) -> Result<()> {
        let mut refunds = self.refunds.write().await;
        refunds.insert(merchant_refund_id.to_string(), "completed".to_string());
        Ok(())
    }

    async fn update_refund_state(
        &self,
        merchant_refund_id: &str,
        state: &str,
        _payload: &Value,
    ) -> Result<()> {
        let mut refunds = self.refunds.write().await;
        refunds.insert(merchant_refund_id.to_string(), state.to_lowercase());
        Ok(())
    }

    async fn update_subscription_state(&self, subscription_id: &str, state: &str) -> Result<()> {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.insert(subscription_id.to_string(), state.to_lowercase());
        Ok(())
    }

    async fn record_event(
        &self,
        category: &str,
        reference: &str,
        status: &str,
        payload: &Value,
    ) -> Result<()> {
        let mut events = self.events.write().await;
        events.push(json!({
            "category": category,
            "reference": reference,
            "status": status,
            "payload": payload,
        }));
        Ok(())
    }
}

/// Configuration for [`RestStore`]
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Base URL of the REST API (without `/rest/v1`)
    pub base_url: String,
    /// Service-role key used for backend operations
    pub service_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl RestStoreConfig {
    /// Create a new REST store config
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            service_key: service_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Load from `SUPABASE_URL` / `SUPABASE_SERVICE_ROLE_KEY`; `None` when the
    /// variables are not set
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("SUPABASE_URL").ok().filter(|v| !v.is_empty())?;
        let service_key = env::var("SUPABASE_SERVICE_ROLE_KEY")
            .ok()
            .filter(|v| !v.is_empty())?;
        Some(Self::new(base_url, service_key))
    }
}

/// REST store implementation speaking a Supabase-style API
#[derive(Debug, Clone)]
pub struct RestStore {
    config: RestStoreConfig,
    http: reqwest::Client,
}

impl RestStore {
    /// Create a new REST store
    pub fn new(config: RestStoreConfig) -> Result<Self> {
        if config.base_url.is_empty() || config.service_key.is_empty() {
            return Err(GatewayError::config("Missing REST store configuration"));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url, table)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.service_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.service_key),
            )
            .header("Prefer", "return=representation")
    }

    async fn insert(&self, table: &str, body: Value) -> Result<()> {
        let response = self
            .authed(self.http.post(self.endpoint(table)))
            .json(&body)
            .send()
            .await?;
        Self::check(table, response).await
    }

    async fn patch(&self, table: &str, filter: (&str, String), body: Value) -> Result<()> {
        let response = self
            .authed(self.http.patch(self.endpoint(table)))
            .query(&[filter])
            .json(&body)
            .send()
            .await?;
        Self::check(table, response).await
    }

    async fn check(table: &str, response: reqwest::Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Store API error on {}: {} - {}", table, status, body);
        Err(GatewayError::gateway(status.as_u16(), body))
    }
}

#[async_trait]
impl PaymentStore for RestStore {
    async fn record_order(&self, order: &OrderRecord) -> Result<()> {
        self.insert(
            "payment_transactions",
            json!({
                "user_id": order.user_id,
                "merchant_order_id": order.merchant_order_id,
                "amount_paisa": order.amount_minor_units,
                "base_amount": order.base_amount,
                "tax_amount": order.tax_amount,
                "status": "pending",
                "metadata": {
                    "plan_id": order.plan_id,
                    "plan_name": order.plan_name,
                },
            }),
        )
        .await?;

        // Detailed gateway-side tracking record alongside the transaction
        self.insert(
            "gateway_transactions",
            json!({
                "merchant_order_id": order.merchant_order_id,
                "user_id": order.user_id,
                "amount_paisa": order.amount_minor_units,
                "state": "PENDING",
                "expires_at": order.expires_at,
            }),
        )
        .await
    }

    async fn update_payment_state(
        &self,
        merchant_order_id: &str,
        state: PaymentState,
        details: &Value,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let mut update = json!({
            "status": state.to_string().to_lowercase(),
            "gateway_state": state.to_string(),
            "payment_details": details,
            "updated_at": now,
        });
        match state {
            PaymentState::Completed => update["completed_at"] = json!(now),
            PaymentState::Failed => update["failed_at"] = json!(now),
            PaymentState::Pending => {}
        }

        self.patch(
            "payment_transactions",
            ("merchant_order_id", format!("eq.{}", merchant_order_id)),
            update,
        )
        .await?;

        self.patch(
            "gateway_transactions",
            ("merchant_order_id", format!("eq.{}", merchant_order_id)),
            json!({
                "state": state.to_string(),
                "payment_details": details,
                "verified_at": Utc::now().to_rfc3339(),
            }),
        )
        .await
    }

    async fn complete_refund(&self, merchant_refund_id: &str, payload: &Value) -> Result<()> {
        self.patch(
            "payment_refunds",
            ("merchant_refund_id", format!("eq.{}", merchant_refund_id)),
            json!({
                "status": "completed",
                "payload": payload,
                "completed_at": Utc::now().to_rfc3339(),
            }),
        )
        .await
    }

    async fn update_refund_state(
        &self,
        merchant_refund_id: &str,
        state: &str,
        payload: &Value,
    ) -> Result<()> {
        self.patch(
            "payment_refunds",
            ("merchant_refund_id", format!("eq.{}", merchant_refund_id)),
            json!({
                "status": state.to_lowercase(),
                "payload": payload,
                "updated_at": Utc::now().to_rfc3339(),
            }),
        )
        .await
    }

    async fn update_subscription_state(&self, subscription_id: &str, state: &str) -> Result<()> {
        self.patch(
            "subscriptions",
            ("subscription_id", format!("eq.{}", subscription_id)),
            json!({
                "status": state.to_lowercase(),
                "updated_at": Utc::now().to_rfc3339(),
            }),
        )
        .await
    }

    async fn record_event(
        &self,
        category: &str,
        reference: &str,
        status: &str,
        payload: &Value,
    ) -> Result<()> {
        self.insert(
            "gateway_events",
            json!({
                "category": category,
                "reference": reference,
                "status": status,
                "payload": payload,
                "created_at": Utc::now().to_rfc3339(),
            }),
        )
        .await
    }
}
