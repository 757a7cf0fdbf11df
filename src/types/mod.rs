//! Core types for the gateway integration
//!
//! Typed representations of everything that crosses a boundary: order and
//! refund requests/results, normalized payment states, webhook envelopes and
//! event types, and the structured [`CallResult`]/[`CallFailure`] variants that
//! gateway operations return instead of raising errors.
//!
//! # Examples
//!
//! ```
//! use phonepe_gateway::types::{EventType, OrderPricing, PaymentState};
//! use rust_decimal::Decimal;
//!
//! # fn example() -> phonepe_gateway::Result<()> {
//! let pricing = OrderPricing::compute(Decimal::from(100), None)?;
//! assert_eq!(pricing.amount_minor_units, 10_000);
//!
//! assert_eq!(PaymentState::parse("COMPLETED"), Some(PaymentState::Completed));
//! assert!(EventType::parse("checkout.order.completed").is_some());
//! # Ok(())
//! # }
//! ```

pub mod order;
pub mod refund;
pub mod result;
pub mod status;
pub mod webhook;

// Re-export commonly used types
pub use order::{
    merchant_order_id, merchant_refund_id, CheckoutResponse, CreateOrderRequest, OrderPricing,
    OrderSuccess, ENABLED_PAYMENT_MODES, ORDER_EXPIRE_AFTER_SECS,
};
pub use refund::{RefundRequest, RefundResponse, RefundSuccess};
pub use result::{CallFailure, CallResult, FailureKind};
pub use status::{PaymentState, StatusSuccess};
pub use webhook::{EventType, WebhookAck, WebhookEnvelope};
