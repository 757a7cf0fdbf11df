//! PhonePe Gateway Server
//!
//! A standalone payment backend wrapping the PhonePe merchant API: checkout
//! order creation, status checks, refunds, and verified webhook processing.
//!
//! ## Storage Backends
//!
//! - **In-Memory**: Default storage (data lost on restart)
//! - **REST**: Supabase-style backend, selected when `SUPABASE_URL` and
//!   `SUPABASE_SERVICE_ROLE_KEY` are set

use std::env;
use std::sync::Arc;

use phonepe_gateway::server::{router, AppState};
use phonepe_gateway::store::{InMemoryStore, PaymentStore, RestStore, RestStoreConfig};
use phonepe_gateway::{GatewayClient, GatewayConfig, WebhookProcessor};

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env()?;
    let webhook_secret = config.webhook_secret.clone();
    tracing::info!(
        "Starting gateway server for merchant {} (client {})",
        config.merchant_id,
        config.masked_client_id()
    );

    let client = Arc::new(GatewayClient::new(config)?);

    // Probe credentials up front so misconfiguration fails loudly, not on the
    // first payment
    if client.tokens().validate_credentials().await {
        tracing::info!("Gateway credentials validated");
    } else {
        tracing::warn!("Gateway credential validation failed; payments will not succeed");
    }

    let store: Arc<dyn PaymentStore> = match RestStoreConfig::from_env() {
        Some(rest_config) => {
            tracing::info!("Using REST storage: {}", rest_config.base_url);
            Arc::new(RestStore::new(rest_config)?)
        }
        None => {
            tracing::info!("Using in-memory storage");
            Arc::new(InMemoryStore::new())
        }
    };

    let webhooks = WebhookProcessor::new(webhook_secret, store.clone());
    let app = router(AppState::new(client, webhooks, store));

    let bind_address = env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Gateway server listening on http://{}", bind_address);
    println!("Gateway server running on http://{}", bind_address);
    println!("Available endpoints:");
    println!("   GET  /api/health - Service and token status");
    println!("   POST /api/payments - Create a payment order");
    println!("   GET  /api/payments/{{merchant_order_id}} - Check order status");
    println!("   POST /api/refunds - Initiate a refund");
    println!("   POST /api/webhooks/gateway - Signed gateway callbacks");

    axum::serve(listener, app).await?;

    Ok(())
}
