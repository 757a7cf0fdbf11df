//! Payment order types and id/amount computation

use crate::{GatewayError, Result};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Checkout session lifetime requested from the gateway, in seconds
pub const ORDER_EXPIRE_AFTER_SECS: u64 = 1800;

/// Payment modes offered to the customer at checkout
pub const ENABLED_PAYMENT_MODES: [&str; 4] = ["UPI", "CARD", "NET_BANKING", "WALLET"];

/// Generate a merchant order id: `<prefix>_<user8>_<unix_ts>`
///
/// `user8` is the first 8 characters of the user id (the whole id when
/// shorter). Two orders for the same user-id prefix within the same second
/// collide; the format is kept as-is because the gateway and stored records
/// correlate on it.
pub fn merchant_order_id(prefix: &str, user_id: &str) -> String {
    let user_hash: String = user_id.chars().take(8).collect();
    format!("{}_{}_{}", prefix, user_hash, Utc::now().timestamp())
}

/// Generate a merchant refund id from the original order id
pub fn merchant_refund_id(original_merchant_order_id: &str) -> String {
    format!(
        "REFUND_{}_{}",
        original_merchant_order_id,
        Utc::now().timestamp()
    )
}

/// Amount breakdown for an order
///
/// The caller supplies the amount in major currency units (rupees); the
/// gateway is charged in minor units (paisa). An optional tax percentage is
/// added on top before conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricing {
    /// Caller-supplied amount in major units
    pub base_amount: Decimal,
    /// Tax added on top, in major units (zero when no tax is configured)
    pub tax_amount: Decimal,
    /// Total charged, in major units
    pub total_amount: Decimal,
    /// Total charged, in minor units (major x 100, truncated)
    pub amount_minor_units: i64,
}

impl OrderPricing {
    /// Compute the pricing breakdown for a major-unit amount
    pub fn compute(amount: Decimal, tax_percent: Option<Decimal>) -> Result<Self> {
        let tax_amount = match tax_percent {
            Some(percent) => amount * percent / Decimal::from(100),
            None => Decimal::ZERO,
        };
        let total_amount = amount + tax_amount;
        let amount_minor_units = (total_amount * Decimal::from(100))
            .trunc()
            .to_i64()
            .ok_or_else(|| GatewayError::validation("Amount out of range"))?;

        Ok(Self {
            base_amount: amount,
            tax_amount,
            total_amount,
            amount_minor_units,
        })
    }
}

/// Request body for creating a payment order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    /// User identifier
    pub user_id: String,
    /// Subscription plan id
    pub plan_id: String,
    /// Amount in major currency units
    pub amount: Decimal,
    /// Display name of the plan
    pub plan_name: String,
}

/// Successful order creation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSuccess {
    /// Always `true`
    pub success: bool,
    /// Generated merchant order id
    pub merchant_order_id: String,
    /// Checkout token returned by the gateway
    pub payment_token: Option<String>,
    /// Hosted checkout URL, when the gateway returns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_url: Option<String>,
    /// Checkout session expiry reported by the gateway (epoch millis/seconds,
    /// opaque to this crate)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    /// Amount charged, in minor units
    pub amount: i64,
    /// Pricing breakdown in major units
    #[serde(flatten)]
    pub pricing: OrderPricing,
    /// User the order was created for
    pub user_id: String,
    /// Plan the order was created for
    pub plan_id: String,
    /// Plan display name
    pub plan_name: String,
}

/// Checkout endpoint response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    /// Checkout token for the embedded payment flow
    pub token: Option<String>,
    /// Session expiry timestamp
    pub expires_at: Option<i64>,
    /// Hosted payment page URL
    pub payment_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_merchant_order_id_format() {
        let id = merchant_order_id("LEKHAK", "user1234567890");
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts[0], "LEKHAK");
        assert_eq!(parts[1], "user1234");
        assert_eq!(parts[2].len(), 10);
        assert!(parts[2].parse::<u64>().is_ok());
    }

    #[test]
    fn test_merchant_order_id_short_user() {
        let id = merchant_order_id("ORDER", "u1");
        assert!(id.starts_with("ORDER_u1_"));
    }

    #[test]
    fn test_merchant_refund_id_format() {
        let id = merchant_refund_id("ORDER_user1234_1700000000");
        assert!(id.starts_with("REFUND_ORDER_user1234_1700000000_"));
    }

    #[test]
    fn test_pricing_without_tax() {
        let pricing = OrderPricing::compute(Decimal::from(100), None).unwrap();
        assert_eq!(pricing.base_amount, Decimal::from(100));
        assert_eq!(pricing.tax_amount, Decimal::ZERO);
        assert_eq!(pricing.total_amount, Decimal::from(100));
        assert_eq!(pricing.amount_minor_units, 10000);
    }

    #[test]
    fn test_pricing_with_gst() {
        let pricing =
            OrderPricing::compute(Decimal::from(100), Some(Decimal::from(18))).unwrap();
        assert_eq!(pricing.tax_amount, Decimal::from(18));
        assert_eq!(pricing.total_amount, Decimal::from(118));
        assert_eq!(pricing.amount_minor_units, 11800);
    }

    #[test]
    fn test_pricing_truncates_fractional_paisa() {
        let amount = Decimal::from_str("99.999").unwrap();
        let pricing = OrderPricing::compute(amount, None).unwrap();
        assert_eq!(pricing.amount_minor_units, 9999);
    }
}
