//! Tests for the gateway client

use super::GatewayClient;
use crate::config::GatewayConfig;
use crate::types::FailureKind;
use chrono::Utc;
use mockito::{Matcher, Server, ServerGuard};
use rust_decimal::Decimal;
use serde_json::json;

fn client_for(server: &ServerGuard) -> GatewayClient {
    let url = server.url();
    let config = GatewayConfig::new(
        "client-id",
        "client-secret",
        format!("{}/oauth/token", url),
        format!("{}/checkout/pay", url),
        format!("{}/checkout/order", url),
        format!("{}/payments/refund", url),
        "MERCHANT123",
        "whsec",
    );
    GatewayClient::new(config).unwrap()
}

async fn mock_auth(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "tok_test",
                "expires_at": Utc::now().timestamp() + 3600
            })
            .to_string(),
        )
        .create_async()
        .await
}

#[tokio::test]
async fn test_create_order_rejects_non_positive_amount() {
    let mut server = Server::new_async().await;
    let auth = server
        .mock("POST", "/oauth/token")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let failure = client
        .create_order("user_1", "plan_1", Decimal::ZERO, "Plan")
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Validation);
    assert_eq!(failure.error, "Invalid amount");
    auth.assert_async().await;
}

#[tokio::test]
async fn test_create_order_rejects_empty_ids() {
    let mut server = Server::new_async().await;
    let auth = server
        .mock("POST", "/oauth/token")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let failure = client
        .create_order("", "plan_1", Decimal::from(100), "Plan")
        .await
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::Validation);

    let failure = client
        .create_order("user_1", "", Decimal::from(100), "Plan")
        .await
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::Validation);
    auth.assert_async().await;
}

#[tokio::test]
async fn test_create_order_success() {
    let mut server = Server::new_async().await;
    let _auth = mock_auth(&mut server).await;
    let checkout = server
        .mock("POST", "/checkout/pay")
        .match_header("authorization", "O-Bearer tok_test")
        .match_body(Matcher::PartialJson(json!({
            "merchantId": "MERCHANT123",
            "amount": 10000,
            "paymentFlow": "IFRAME",
            "expireAfter": 1800,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"token": "abc", "expiresAt": 1234}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let order = client
        .create_order("user12345678", "planA", Decimal::from(100), "Pro")
        .await
        .unwrap();

    assert!(order.success);
    assert_eq!(order.payment_token.as_deref(), Some("abc"));
    assert_eq!(order.expires_at, Some(1234));
    assert_eq!(order.amount, 10000);
    assert_eq!(order.pricing.tax_amount, Decimal::ZERO);

    let parts: Vec<&str> = order.merchant_order_id.splitn(3, '_').collect();
    assert_eq!(parts[0], "ORDER");
    assert_eq!(parts[1], "user1234");
    assert_eq!(parts[2].len(), 10);
    assert!(parts[2].parse::<u64>().is_ok());

    checkout.assert_async().await;
}

#[tokio::test]
async fn test_create_order_applies_configured_tax() {
    let mut server = Server::new_async().await;
    let _auth = mock_auth(&mut server).await;
    let checkout = server
        .mock("POST", "/checkout/pay")
        .match_body(Matcher::PartialJson(json!({"amount": 11800})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"token": "abc"}).to_string())
        .create_async()
        .await;

    let url = server.url();
    let config = GatewayConfig::new(
        "client-id",
        "client-secret",
        format!("{}/oauth/token", url),
        format!("{}/checkout/pay", url),
        format!("{}/checkout/order", url),
        format!("{}/payments/refund", url),
        "MERCHANT123",
        "whsec",
    )
    .with_tax_percent(Decimal::from(18));
    let client = GatewayClient::new(config).unwrap();

    let order = client
        .create_order("user12345678", "planA", Decimal::from(100), "Pro")
        .await
        .unwrap();

    assert_eq!(order.amount, 11800);
    assert_eq!(order.pricing.base_amount, Decimal::from(100));
    assert_eq!(order.pricing.tax_amount, Decimal::from(18));
    checkout.assert_async().await;
}

#[tokio::test]
async fn test_create_order_auth_failure_skips_checkout() {
    let mut server = Server::new_async().await;
    let _auth = server
        .mock("POST", "/oauth/token")
        .with_status(401)
        .with_body("invalid_client")
        .create_async()
        .await;
    let checkout = server
        .mock("POST", "/checkout/pay")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let failure = client
        .create_order("user12345678", "planA", Decimal::from(100), "Pro")
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Auth);
    assert_eq!(failure.error, "Failed to get access token");
    checkout.assert_async().await;
}

#[tokio::test]
async fn test_create_order_gateway_failure_is_reported_not_retried() {
    let mut server = Server::new_async().await;
    let _auth = mock_auth(&mut server).await;
    let checkout = server
        .mock("POST", "/checkout/pay")
        .with_status(502)
        .with_body("upstream unavailable")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let failure = client
        .create_order("user12345678", "planA", Decimal::from(100), "Pro")
        .await
        .unwrap_err();

    assert_eq!(failure.kind, FailureKind::Gateway);
    assert_eq!(failure.error, "Payment order creation failed");
    assert_eq!(failure.status_code, Some(502));
    assert_eq!(failure.details.as_deref(), Some("upstream unavailable"));
    checkout.assert_async().await;
}

#[tokio::test]
async fn test_check_status_success() {
    let mut server = Server::new_async().await;
    let _auth = mock_auth(&mut server).await;
    let status = server
        .mock("GET", "/checkout/order/ORDER_user1234_1700000000/status")
        .match_query(Matcher::UrlEncoded("details".into(), "true".into()))
        .match_header("authorization", "O-Bearer tok_test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "orderId": "OMO123",
                "payload": {
                    "state": "COMPLETED",
                    "amount": 10000,
                    "paymentDetails": [{"paymentMode": "UPI"}]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client
        .check_status("ORDER_user1234_1700000000", true)
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.state.as_deref(), Some("COMPLETED"));
    assert_eq!(result.amount, Some(10000));
    assert_eq!(result.payment_details[0]["paymentMode"], "UPI");
    status.assert_async().await;
}

#[tokio::test]
async fn test_check_status_gateway_failure() {
    let mut server = Server::new_async().await;
    let _auth = mock_auth(&mut server).await;
    let _status = server
        .mock("GET", "/checkout/order/ORDER_missing/status")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("order not found")
        .create_async()
        .await;

    let client = client_for(&server);
    let failure = client.check_status("ORDER_missing", false).await.unwrap_err();

    assert_eq!(failure.kind, FailureKind::Gateway);
    assert_eq!(failure.error, "Status check failed");
    assert_eq!(failure.status_code, Some(404));
}

#[tokio::test]
async fn test_check_status_rejects_empty_order_id() {
    let server = Server::new_async().await;
    let client = client_for(&server);
    let failure = client.check_status("", true).await.unwrap_err();
    assert_eq!(failure.kind, FailureKind::Validation);
}

#[tokio::test]
async fn test_initiate_refund_success() {
    let mut server = Server::new_async().await;
    let _auth = mock_auth(&mut server).await;
    let refund = server
        .mock("POST", "/payments/refund")
        .match_header("authorization", "O-Bearer tok_test")
        .match_body(Matcher::PartialJson(json!({
            "merchantId": "MERCHANT123",
            "originalMerchantOrderId": "ORDER_user1234_1700000000",
            "amount": 5000,
            "reason": "customer request",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"refundId": "RF001", "state": "ACCEPTED"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client
        .initiate_refund("ORDER_user1234_1700000000", Decimal::from(50), "customer request")
        .await
        .unwrap();

    assert!(result.success);
    assert!(result
        .merchant_refund_id
        .starts_with("REFUND_ORDER_user1234_1700000000_"));
    assert_eq!(result.refund_id.as_deref(), Some("RF001"));
    assert_eq!(result.state, "ACCEPTED");
    assert_eq!(result.amount, 5000);
    refund.assert_async().await;
}

#[tokio::test]
async fn test_initiate_refund_defaults_state_to_pending() {
    let mut server = Server::new_async().await;
    let _auth = mock_auth(&mut server).await;
    let _refund = server
        .mock("POST", "/payments/refund")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"refundId": "RF002"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    let result = client
        .initiate_refund("ORDER_X", Decimal::from(10), "duplicate charge")
        .await
        .unwrap();

    assert_eq!(result.state, "PENDING");
}

#[tokio::test]
async fn test_initiate_refund_rejects_invalid_amount() {
    let server = Server::new_async().await;
    let client = client_for(&server);
    let failure = client
        .initiate_refund("ORDER_X", Decimal::from(-5), "reason")
        .await
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::Validation);
    assert_eq!(failure.error, "Invalid refund amount");
}

#[tokio::test]
async fn test_token_reused_across_operations() {
    let mut server = Server::new_async().await;
    let auth = server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "tok_test",
                "expires_at": Utc::now().timestamp() + 3600
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let _checkout = server
        .mock("POST", "/checkout/pay")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"token": "abc"}).to_string())
        .create_async()
        .await;
    let _status = server
        .mock("GET", Matcher::Regex(r"^/checkout/order/.*/status$".to_string()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"payload": {"state": "PENDING"}}).to_string())
        .create_async()
        .await;

    let client = client_for(&server);
    client
        .create_order("user12345678", "planA", Decimal::from(100), "Pro")
        .await
        .unwrap();
    client.check_status("ORDER_user1234_1", true).await.unwrap();

    auth.assert_async().await;
}

#[test]
fn test_service_info() {
    let config = GatewayConfig::new(
        "client-id",
        "client-secret",
        "https://auth.example.com/token",
        "https://api.example.com/pay",
        "https://api.example.com/order",
        "https://api.example.com/refund",
        "MERCHANT123",
        "whsec",
    );
    let client = GatewayClient::new(config).unwrap();
    let info = client.service_info();
    assert_eq!(info.merchant_id, "MERCHANT123");
    assert_eq!(info.checkout_url, "https://api.example.com/pay");
}
