//! # PhonePe Gateway Integration
//!
//! A type-safe Rust integration for the PhonePe payment gateway: OAuth token
//! management, checkout order creation, status checks, refunds, and verified
//! webhook processing with pluggable persistence.
//!
//! ## Features
//!
//! - **Cached OAuth tokens**: single-flight client-credentials exchange with
//!   early refresh before expiry
//! - **Structured failures**: gateway operations return typed
//!   [`CallResult`](types::CallResult) values instead of raising errors
//! - **Verified webhooks**: constant-time SHA256 signature checks before any
//!   event is dispatched
//! - **Pluggable persistence**: in-memory store for tests, REST store for
//!   production backends
//! - **Axum HTTP surface** (default feature): ready-made routes for payments,
//!   refunds, status, health, and webhook callbacks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use phonepe_gateway::{GatewayClient, GatewayConfig};
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GatewayConfig::from_env()?;
//!     let client = GatewayClient::new(config)?;
//!
//!     match client
//!         .create_order("user_12345678", "pro_plan", Decimal::from(499), "Pro")
//!         .await
//!     {
//!         Ok(order) => println!("order created: {}", order.merchant_order_id),
//!         Err(failure) => eprintln!("order failed: {}", failure.error),
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`types`**: order, status, refund, and webhook data structures
//! - **`auth`**: OAuth token cache and credential exchange
//! - **`client`**: authenticated gateway calls
//! - **`webhook`**: signature verification and event dispatch
//! - **`store`**: persistence backends
//! - **`config`**: environment-driven configuration
//! - **`error`**: error handling
//! - **`server`**: axum HTTP surface (feature-gated)

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod store;
pub mod types;
pub mod webhook;

// HTTP surface (feature-gated)
#[cfg(feature = "axum")]
pub mod server;

// Re-exports for convenience
pub use auth::TokenCache;
pub use client::GatewayClient;
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use store::{InMemoryStore, PaymentStore, RestStore};
pub use webhook::{WebhookProcessor, WebhookVerifier};

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_public_surface() {
        let pricing = types::OrderPricing::compute(Decimal::from(499), None).unwrap();
        assert_eq!(pricing.amount_minor_units, 49_900);

        let verifier = WebhookVerifier::new("whsec");
        assert!(!verifier.verify("", b"{}"));
    }
}
