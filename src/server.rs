//! HTTP surface for the gateway integration
//!
//! Thin axum layer over [`GatewayClient`], [`WebhookProcessor`], and the
//! [`PaymentStore`]: request parsing, failure-to-status mapping, and
//! persistence of successful orders. No payment logic lives here.
//!
//! Routes:
//! - `GET /api/health` - service and token status
//! - `POST /api/payments` - create a payment order
//! - `GET /api/payments/{merchant_order_id}` - check order status
//! - `POST /api/refunds` - initiate a refund
//! - `POST /api/webhooks/gateway` - signed gateway callbacks

use crate::client::GatewayClient;
use crate::store::{OrderRecord, PaymentStore};
use crate::types::{CallFailure, CreateOrderRequest, FailureKind, RefundRequest};
use crate::webhook::WebhookProcessor;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Gateway client for merchant API calls
    pub client: Arc<GatewayClient>,
    /// Webhook verification and dispatch
    pub webhooks: WebhookProcessor,
    /// Persistence backend
    pub store: Arc<dyn PaymentStore>,
}

impl AppState {
    /// Assemble application state from its collaborators
    pub fn new(
        client: Arc<GatewayClient>,
        webhooks: WebhookProcessor,
        store: Arc<dyn PaymentStore>,
    ) -> Self {
        Self {
            client,
            webhooks,
            store,
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/payments", post(create_payment_handler))
        .route(
            "/api/payments/{merchant_order_id}",
            get(payment_status_handler),
        )
        .route("/api/refunds", post(refund_handler))
        .route("/api/webhooks/gateway", post(webhook_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn failure_status(failure: &CallFailure) -> StatusCode {
    match failure.kind {
        FailureKind::Validation => StatusCode::BAD_REQUEST,
        FailureKind::Auth | FailureKind::Gateway | FailureKind::Network => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let token_info = state.client.tokens().token_info().await;
    let service_info = state.client.service_info();
    Json(json!({
        "status": "healthy",
        "version": crate::VERSION,
        "service": service_info,
        "token": token_info,
    }))
}

async fn create_payment_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> std::result::Result<Json<Value>, (StatusCode, Json<CallFailure>)> {
    let order = state
        .client
        .create_order(
            &request.user_id,
            &request.plan_id,
            request.amount,
            &request.plan_name,
        )
        .await
        .map_err(|failure| (failure_status(&failure), Json(failure)))?;

    // Persistence is best-effort; the order already exists at the gateway
    if let Err(e) = state.store.record_order(&OrderRecord::from(&order)).await {
        tracing::error!("Failed to record order {}: {}", order.merchant_order_id, e);
    }

    Ok(Json(serde_json::to_value(&order).unwrap_or_default()))
}

#[derive(Debug, Deserialize)]
struct StatusQuery {
    #[serde(default)]
    details: bool,
}

async fn payment_status_handler(
    State(state): State<AppState>,
    Path(merchant_order_id): Path<String>,
    Query(query): Query<StatusQuery>,
) -> std::result::Result<Json<Value>, (StatusCode, Json<CallFailure>)> {
    let status = state
        .client
        .check_status(&merchant_order_id, query.details)
        .await
        .map_err(|failure| (failure_status(&failure), Json(failure)))?;

    Ok(Json(serde_json::to_value(&status).unwrap_or_default()))
}

async fn refund_handler(
    State(state): State<AppState>,
    Json(request): Json<RefundRequest>,
) -> std::result::Result<Json<Value>, (StatusCode, Json<CallFailure>)> {
    let refund = state
        .client
        .initiate_refund(&request.merchant_order_id, request.amount, &request.reason)
        .await
        .map_err(|failure| (failure_status(&failure), Json(failure)))?;

    if let Err(e) = state
        .store
        .update_refund_state(
            &refund.merchant_refund_id,
            &refund.state,
            &serde_json::to_value(&refund).unwrap_or_default(),
        )
        .await
    {
        tracing::error!(
            "Failed to record refund {}: {}",
            refund.merchant_refund_id,
            e
        );
    }

    Ok(Json(serde_json::to_value(&refund).unwrap_or_default()))
}

async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> std::result::Result<Json<Value>, (StatusCode, Json<Value>)> {
    let auth_header = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok());

    match state.webhooks.process(auth_header, &body).await {
        Ok(ack) => Ok(Json(serde_json::to_value(&ack).unwrap_or_default())),
        Err(rejection) => {
            let status = StatusCode::from_u16(rejection.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err((status, Json(json!({"detail": rejection.to_string()}))))
        }
    }
}
