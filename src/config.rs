//! Gateway configuration
//!
//! [`GatewayConfig`] carries everything the client and webhook components need:
//! OAuth credentials, the four gateway endpoint URLs, the merchant id, and the
//! webhook shared secret. Construction fails fast when a required value is
//! absent; a process with missing configuration must not serve requests.

use crate::{GatewayError, Result};
use rust_decimal::Decimal;
use std::env;
use std::time::Duration;

/// Default request timeout for all outbound gateway calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default prefix for generated merchant order ids
pub const DEFAULT_ORDER_PREFIX: &str = "ORDER";

/// Configuration for the payment gateway integration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// OAuth client version sent with the credential exchange
    pub client_version: String,
    /// Authorization (token exchange) endpoint URL
    pub auth_url: String,
    /// Checkout (order creation) endpoint URL
    pub checkout_url: String,
    /// Order status endpoint base URL
    pub status_url: String,
    /// Refund endpoint URL
    pub refund_url: String,
    /// Merchant identifier registered with the gateway
    pub merchant_id: String,
    /// Shared secret for inbound webhook signature verification
    pub webhook_secret: String,
    /// Prefix for generated merchant order ids
    pub order_prefix: String,
    /// URL the gateway redirects the customer to after checkout
    pub redirect_url: Option<String>,
    /// URL the gateway posts webhooks to
    pub callback_url: Option<String>,
    /// Optional tax markup applied to order amounts, in percent (e.g. 18 for
    /// 18% GST). `None` charges the caller-supplied amount unchanged.
    pub tax_percent: Option<Decimal>,
    /// Timeout for outbound HTTP calls
    pub timeout: Duration,
}

impl GatewayConfig {
    /// Create a config with the required fields and defaults for the rest
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        auth_url: impl Into<String>,
        checkout_url: impl Into<String>,
        status_url: impl Into<String>,
        refund_url: impl Into<String>,
        merchant_id: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            client_version: "1".to_string(),
            auth_url: auth_url.into(),
            checkout_url: checkout_url.into(),
            status_url: status_url.into(),
            refund_url: refund_url.into(),
            merchant_id: merchant_id.into(),
            webhook_secret: webhook_secret.into(),
            order_prefix: DEFAULT_ORDER_PREFIX.to_string(),
            redirect_url: None,
            callback_url: None,
            tax_percent: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from environment variables
    ///
    /// Required: `PHONEPE_CLIENT_ID`, `PHONEPE_CLIENT_SECRET`, `PHONEPE_AUTH_URL`,
    /// `PHONEPE_CHECKOUT_URL`, `PHONEPE_STATUS_URL`, `PHONEPE_REFUND_URL`,
    /// `PHONEPE_MERCHANT_ID`, `PHONEPE_WEBHOOK_SECRET`.
    ///
    /// Optional: `PHONEPE_CLIENT_VERSION` (default "1"), `PHONEPE_ORDER_PREFIX`,
    /// `SUCCESS_URL`, `CALLBACK_URL`, `PHONEPE_TAX_PERCENT`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(
            required_var("PHONEPE_CLIENT_ID")?,
            required_var("PHONEPE_CLIENT_SECRET")?,
            required_var("PHONEPE_AUTH_URL")?,
            required_var("PHONEPE_CHECKOUT_URL")?,
            required_var("PHONEPE_STATUS_URL")?,
            required_var("PHONEPE_REFUND_URL")?,
            required_var("PHONEPE_MERCHANT_ID")?,
            required_var("PHONEPE_WEBHOOK_SECRET")?,
        );

        if let Ok(version) = env::var("PHONEPE_CLIENT_VERSION") {
            config.client_version = version;
        }
        if let Ok(prefix) = env::var("PHONEPE_ORDER_PREFIX") {
            config.order_prefix = prefix;
        }
        config.redirect_url = env::var("SUCCESS_URL").ok();
        config.callback_url = env::var("CALLBACK_URL").ok();

        if let Ok(raw) = env::var("PHONEPE_TAX_PERCENT") {
            let percent: Decimal = raw.parse().map_err(|_| {
                GatewayError::config(format!("PHONEPE_TAX_PERCENT is not a number: {}", raw))
            })?;
            config.tax_percent = Some(percent);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// All required fields must be non-empty and the endpoint URLs must be
    /// http(s). This is the fail-fast startup check: nothing proceeds with a
    /// partially configured gateway.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("client id", &self.client_id),
            ("client secret", &self.client_secret),
            ("auth URL", &self.auth_url),
            ("checkout URL", &self.checkout_url),
            ("status URL", &self.status_url),
            ("refund URL", &self.refund_url),
            ("merchant id", &self.merchant_id),
            ("webhook secret", &self.webhook_secret),
        ];
        for (name, value) in required {
            if value.is_empty() {
                return Err(GatewayError::config(format!("Missing required {}", name)));
            }
        }

        for url in [
            &self.auth_url,
            &self.checkout_url,
            &self.status_url,
            &self.refund_url,
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(GatewayError::config(format!(
                    "Endpoint URL must start with http:// or https://: {}",
                    url
                )));
            }
        }

        if let Some(percent) = self.tax_percent {
            if percent < Decimal::ZERO {
                return Err(GatewayError::config("Tax percent cannot be negative"));
            }
        }

        Ok(())
    }

    /// Set the OAuth client version
    pub fn with_client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = version.into();
        self
    }

    /// Set the merchant order id prefix
    pub fn with_order_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.order_prefix = prefix.into();
        self
    }

    /// Set the post-checkout redirect URL
    pub fn with_redirect_url(mut self, url: impl Into<String>) -> Self {
        self.redirect_url = Some(url.into());
        self
    }

    /// Set the webhook callback URL
    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    /// Set the tax markup percentage applied on top of order amounts
    pub fn with_tax_percent(mut self, percent: Decimal) -> Self {
        self.tax_percent = Some(percent);
        self
    }

    /// Set the outbound request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Client id with all but the first 8 characters masked, for logs and
    /// health reporting
    pub fn masked_client_id(&self) -> String {
        let prefix: String = self.client_id.chars().take(8).collect();
        format!("{}...", prefix)
    }
}

fn required_var(name: &str) -> Result<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| GatewayError::config(format!("Missing required environment variable {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GatewayConfig {
        GatewayConfig::new(
            "client-id-12345",
            "client-secret",
            "https://auth.example.com/v1/oauth/token",
            "https://api.example.com/checkout/v2/pay",
            "https://api.example.com/checkout/v2/order",
            "https://api.example.com/payments/v2/refund",
            "MERCHANT123",
            "webhook-secret",
        )
    }

    #[test]
    fn test_valid_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_missing_client_id_fails() {
        let mut config = test_config();
        config.client_id = String::new();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn test_missing_webhook_secret_fails() {
        let mut config = test_config();
        config.webhook_secret = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_http_url_fails() {
        let mut config = test_config();
        config.auth_url = "ftp://auth.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_negative_tax_percent_fails() {
        let config = test_config().with_tax_percent(Decimal::from(-1));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builder_setters() {
        let config = test_config()
            .with_client_version("2")
            .with_order_prefix("LEKHAK")
            .with_tax_percent(Decimal::from(18));
        assert_eq!(config.client_version, "2");
        assert_eq!(config.order_prefix, "LEKHAK");
        assert_eq!(config.tax_percent, Some(Decimal::from(18)));
    }

    #[test]
    fn test_masked_client_id() {
        assert_eq!(test_config().masked_client_id(), "client-i...");
    }
}
