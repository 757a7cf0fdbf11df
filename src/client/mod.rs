//! Gateway client for checkout orders, status checks, and refunds
//!
//! [`GatewayClient`] issues the three authenticated gateway calls. Every
//! operation validates its input before touching the network, authenticates
//! via [`TokenCache`], and reports failures as structured
//! [`CallFailure`](crate::types::CallFailure) results instead of propagating
//! errors — the HTTP layer maps failure kinds to status codes uniformly.
//! There is no retry anywhere in this client; retry policy belongs to the
//! caller.
//!
//! # Examples
//!
//! ```no_run
//! use phonepe_gateway::client::GatewayClient;
//! use phonepe_gateway::config::GatewayConfig;
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> phonepe_gateway::Result<()> {
//! let client = GatewayClient::new(GatewayConfig::from_env()?)?;
//!
//! match client
//!     .create_order("user_12345678", "pro_plan", Decimal::from(499), "Pro")
//!     .await
//! {
//!     Ok(order) => println!("checkout token: {:?}", order.payment_token),
//!     Err(failure) => println!("order failed: {}", failure.error),
//! }
//! # Ok(())
//! # }
//! ```

use crate::auth::TokenCache;
use crate::config::GatewayConfig;
use crate::types::{
    merchant_order_id, merchant_refund_id, CallFailure, CallResult, CheckoutResponse,
    OrderPricing, OrderSuccess, RefundResponse, RefundSuccess, StatusSuccess,
    ENABLED_PAYMENT_MODES, ORDER_EXPIRE_AFTER_SECS,
};
use crate::{GatewayError, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[cfg(test)]
mod tests;

/// Authorization scheme the gateway expects for merchant API calls
const BEARER_SCHEME: &str = "O-Bearer";

/// Configuration snapshot for health reporting
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    /// Merchant identifier
    pub merchant_id: String,
    /// Checkout endpoint URL
    pub checkout_url: String,
    /// Status endpoint base URL
    pub status_url: String,
    /// Refund endpoint URL
    pub refund_url: String,
}

/// Client for the payment gateway's merchant API
#[derive(Debug, Clone)]
pub struct GatewayClient {
    config: Arc<GatewayConfig>,
    http: reqwest::Client,
    tokens: TokenCache,
}

impl GatewayClient {
    /// Create a new gateway client
    ///
    /// Validates the configuration and builds an HTTP client with the
    /// configured timeout (30 seconds by default). Fails with a `Config`
    /// error when required configuration is absent.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to create HTTP client: {}", e)))?;

        let tokens = TokenCache::new(Arc::clone(&config), http.clone())?;

        Ok(Self {
            config,
            http,
            tokens,
        })
    }

    /// The token cache backing this client, for health reporting and startup
    /// probes
    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Configuration snapshot for health reporting
    pub fn service_info(&self) -> ServiceInfo {
        ServiceInfo {
            merchant_id: self.config.merchant_id.clone(),
            checkout_url: self.config.checkout_url.clone(),
            status_url: self.config.status_url.clone(),
            refund_url: self.config.refund_url.clone(),
        }
    }

    /// Create a payment order
    ///
    /// Validates input, generates the merchant order id, computes the
    /// minor-unit amount (with the configured tax markup, if any), and POSTs
    /// the checkout payload. A token failure is reported before any checkout
    /// call is made.
    pub async fn create_order(
        &self,
        user_id: &str,
        plan_id: &str,
        amount: Decimal,
        plan_name: &str,
    ) -> CallResult<OrderSuccess> {
        if amount <= Decimal::ZERO {
            return Err(CallFailure::validation("Invalid amount"));
        }
        if user_id.is_empty() || plan_id.is_empty() {
            return Err(CallFailure::validation("Missing user_id or plan_id"));
        }

        let pricing = OrderPricing::compute(amount, self.config.tax_percent)
            .map_err(|e| CallFailure::from_error("Payment order creation failed", &e))?;
        let order_id = merchant_order_id(&self.config.order_prefix, user_id);

        let token = match self.tokens.token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("Payment creation aborted, no access token: {}", e);
                return Err(CallFailure::from_error("Failed to get access token", &e));
            }
        };

        let mut payload = json!({
            "merchantId": self.config.merchant_id,
            "merchantOrderId": order_id,
            "amount": pricing.amount_minor_units,
            "paymentFlow": "IFRAME",
            "expireAfter": ORDER_EXPIRE_AFTER_SECS,
            "metaInfo": {
                "user_id": user_id,
                "plan_id": plan_id,
                "plan_name": plan_name,
                "base_amount": pricing.base_amount,
                "tax_amount": pricing.tax_amount,
                "total_amount": pricing.total_amount,
            },
            "paymentModeConfig": {
                "enabledModes": ENABLED_PAYMENT_MODES,
                "disabledModes": [],
            },
        });
        if let Some(redirect_url) = &self.config.redirect_url {
            payload["redirectUrl"] = json!(redirect_url);
        }
        if let Some(callback_url) = &self.config.callback_url {
            payload["callbackUrl"] = json!(callback_url);
        }

        tracing::info!(
            "Creating payment order {} for {} ({} minor units)",
            order_id,
            user_id,
            pricing.amount_minor_units
        );

        let response = match self
            .http
            .post(&self.config.checkout_url)
            .header("Authorization", format!("{} {}", BEARER_SCHEME, token))
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let err = GatewayError::from(e);
                tracing::error!("Payment creation request failed: {}", err);
                return Err(CallFailure::from_error("Payment order creation failed", &err));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Payment creation failed: {} - {}", status, body);
            return Err(CallFailure::gateway(
                "Payment order creation failed",
                status.as_u16(),
                body,
            ));
        }

        let checkout: CheckoutResponse = match response.json().await {
            Ok(checkout) => checkout,
            Err(e) => {
                return Err(CallFailure::gateway(
                    "Payment order creation failed",
                    status.as_u16(),
                    format!("Unreadable checkout response: {}", e),
                ));
            }
        };

        tracing::info!("Payment order created: {}", order_id);

        Ok(OrderSuccess {
            success: true,
            merchant_order_id: order_id,
            payment_token: checkout.token,
            payment_url: checkout.payment_url,
            expires_at: checkout.expires_at,
            amount: pricing.amount_minor_units,
            pricing,
            user_id: user_id.to_string(),
            plan_id: plan_id.to_string(),
            plan_name: plan_name.to_string(),
        })
    }

    /// Check the status of a payment order
    ///
    /// GETs `<status_url>/<merchant_order_id>/status` and returns the raw
    /// gateway payload plus a normalized `state` field.
    pub async fn check_status(
        &self,
        merchant_order_id: &str,
        include_details: bool,
    ) -> CallResult<StatusSuccess> {
        if merchant_order_id.is_empty() {
            return Err(CallFailure::validation("Missing merchant_order_id"));
        }

        let token = match self.tokens.token().await {
            Ok(token) => token,
            Err(e) => return Err(CallFailure::from_error("Failed to get access token", &e)),
        };

        let endpoint = format!("{}/{}/status", self.config.status_url, merchant_order_id);
        tracing::info!("Checking payment status: {}", merchant_order_id);

        let response = match self
            .http
            .get(&endpoint)
            .header("Authorization", format!("{} {}", BEARER_SCHEME, token))
            .header("Accept", "application/json")
            .query(&[("details", if include_details { "true" } else { "false" })])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let err = GatewayError::from(e);
                return Err(CallFailure::from_error("Status check failed", &err));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Status check failed: {} - {}", status, body);
            return Err(CallFailure::gateway(
                "Status check failed",
                status.as_u16(),
                body,
            ));
        }

        let status_data: Value = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                return Err(CallFailure::gateway(
                    "Status check failed",
                    status.as_u16(),
                    format!("Unreadable status response: {}", e),
                ));
            }
        };

        let result = StatusSuccess::from_gateway(merchant_order_id, status_data);
        tracing::info!(
            "Payment status retrieved: {} - {}",
            merchant_order_id,
            result.state.as_deref().unwrap_or("UNKNOWN")
        );
        Ok(result)
    }

    /// Initiate a refund against a previous order
    pub async fn initiate_refund(
        &self,
        original_merchant_order_id: &str,
        amount: Decimal,
        reason: &str,
    ) -> CallResult<RefundSuccess> {
        if amount <= Decimal::ZERO {
            return Err(CallFailure::validation("Invalid refund amount"));
        }
        if original_merchant_order_id.is_empty() {
            return Err(CallFailure::validation("Missing merchant_order_id"));
        }

        let pricing = OrderPricing::compute(amount, None)
            .map_err(|e| CallFailure::from_error("Refund initiation failed", &e))?;
        let refund_id = merchant_refund_id(original_merchant_order_id);

        let token = match self.tokens.token().await {
            Ok(token) => token,
            Err(e) => return Err(CallFailure::from_error("Failed to get access token", &e)),
        };

        let payload = json!({
            "merchantId": self.config.merchant_id,
            "merchantRefundId": refund_id,
            "originalMerchantOrderId": original_merchant_order_id,
            "amount": pricing.amount_minor_units,
            "reason": reason,
        });

        tracing::info!(
            "Initiating refund {} for {} minor units",
            refund_id,
            pricing.amount_minor_units
        );

        let response = match self
            .http
            .post(&self.config.refund_url)
            .header("Authorization", format!("{} {}", BEARER_SCHEME, token))
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let err = GatewayError::from(e);
                return Err(CallFailure::from_error("Refund initiation failed", &err));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Refund initiation failed: {} - {}", status, body);
            return Err(CallFailure::gateway(
                "Refund initiation failed",
                status.as_u16(),
                body,
            ));
        }

        let refund_data: RefundResponse = match response.json().await {
            Ok(data) => data,
            Err(e) => {
                return Err(CallFailure::gateway(
                    "Refund initiation failed",
                    status.as_u16(),
                    format!("Unreadable refund response: {}", e),
                ));
            }
        };

        tracing::info!("Refund initiated: {}", refund_id);

        Ok(RefundSuccess {
            success: true,
            merchant_refund_id: refund_id,
            refund_id: refund_data.refund_id,
            state: refund_data.state.unwrap_or_else(|| "PENDING".to_string()),
            amount: pricing.amount_minor_units,
            reason: reason.to_string(),
        })
    }
}
