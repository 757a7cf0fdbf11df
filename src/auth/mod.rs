//! OAuth token management
//!
//! [`TokenCache`] holds the short-lived bearer credential used to authenticate
//! gateway calls and refreshes it transparently before it expires. The cached
//! [`Credential`] is the only shared mutable state in the crate; it lives
//! behind a `tokio::sync::Mutex` that is held across the credential exchange,
//! so at most one refresh is in flight and concurrent callers await its result
//! instead of issuing redundant exchanges.
//!
//! # Examples
//!
//! ```no_run
//! use phonepe_gateway::auth::TokenCache;
//! use phonepe_gateway::config::GatewayConfig;
//! use std::sync::Arc;
//!
//! # async fn example() -> phonepe_gateway::Result<()> {
//! let config = Arc::new(GatewayConfig::from_env()?);
//! let cache = TokenCache::new(config, reqwest::Client::new())?;
//!
//! let token = cache.token().await?;
//! # Ok(())
//! # }
//! ```

use crate::config::GatewayConfig;
use crate::{GatewayError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Tokens are refreshed this long before their reported expiry, so a token
/// handed to a caller cannot expire mid-flight during the subsequent API call
const REFRESH_MARGIN_SECS: i64 = 300;

/// Lifetime assumed when the exchange response carries no `expires_at`
const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// A bearer credential with its expiry
///
/// Replaced whole on refresh, never mutated in place.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Opaque bearer token
    pub token: String,
    /// Absolute expiry reported by the authorization endpoint
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// True when the credential is within the refresh margin of its expiry
    fn is_expiring(&self) -> bool {
        Utc::now() >= self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS)
    }
}

/// Snapshot of the cache state for health reporting
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    /// Whether a credential is currently cached
    pub has_token: bool,
    /// Cached credential expiry, if any
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether the next call would trigger a refresh
    pub is_expired: bool,
    /// Masked OAuth client id
    pub client_id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    /// Absolute expiry in epoch seconds
    expires_at: Option<i64>,
}

/// Caching OAuth token provider for gateway calls
#[derive(Debug, Clone)]
pub struct TokenCache {
    config: Arc<GatewayConfig>,
    http: reqwest::Client,
    state: Arc<Mutex<Option<Credential>>>,
}

impl TokenCache {
    /// Create a new token cache
    ///
    /// Fails with a `Config` error when the client id, secret, or auth URL is
    /// missing; a process without credentials must not start serving.
    pub fn new(config: Arc<GatewayConfig>, http: reqwest::Client) -> Result<Self> {
        if config.client_id.is_empty() || config.client_secret.is_empty() || config.auth_url.is_empty()
        {
            return Err(GatewayError::config("Missing required gateway credentials"));
        }

        Ok(Self {
            config,
            http,
            state: Arc::new(Mutex::new(None)),
        })
    }

    /// Get a currently-valid bearer token, refreshing if the cached one is
    /// missing or within 5 minutes of expiry
    ///
    /// The lock is held across the exchange: exactly one refresh runs per
    /// elapsed margin, and concurrent callers receive its result.
    pub async fn token(&self) -> Result<String> {
        let mut state = self.state.lock().await;

        let needs_refresh = match state.as_ref() {
            Some(credential) => credential.is_expiring(),
            None => true,
        };

        if needs_refresh {
            let credential = self.exchange().await?;
            *state = Some(credential);
        }

        // The refresh above guarantees a credential is present
        Ok(state
            .as_ref()
            .map(|c| c.token.clone())
            .unwrap_or_default())
    }

    /// True if no token is cached or the cached one is within the refresh margin
    pub async fn is_expired(&self) -> bool {
        let state = self.state.lock().await;
        match state.as_ref() {
            Some(credential) => credential.is_expiring(),
            None => true,
        }
    }

    /// Force a credential exchange, replacing the cached credential
    pub async fn refresh(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let credential = self.exchange().await?;
        *state = Some(credential);
        Ok(())
    }

    /// Validate credentials by attempting an exchange; used as a startup probe
    pub async fn validate_credentials(&self) -> bool {
        match self.refresh().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Credential validation failed: {}", e);
                false
            }
        }
    }

    /// Snapshot of the cache state for health reporting
    pub async fn token_info(&self) -> TokenInfo {
        let state = self.state.lock().await;
        let credential = state.as_ref();
        TokenInfo {
            has_token: credential.is_some(),
            expires_at: credential.map(|c| c.expires_at),
            is_expired: credential.map(|c| c.is_expiring()).unwrap_or(true),
            client_id: self.config.masked_client_id(),
        }
    }

    /// Perform the client-credentials exchange against the authorization
    /// endpoint
    ///
    /// No internal retry: non-200 responses and network failures both surface
    /// as `Auth` errors and retry policy belongs to the caller.
    async fn exchange(&self) -> Result<Credential> {
        tracing::info!("Refreshing gateway access token");

        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("client_version", self.config.client_version.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let response = self
            .http
            .post(&self.config.auth_url)
            .header("Accept", "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| GatewayError::auth(format!("Network error during token refresh: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Token refresh failed: {} - {}", status, body);
            return Err(GatewayError::auth(format!(
                "Token refresh failed: {} - {}",
                status, body
            )));
        }

        let token_data: TokenResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::auth(format!("Invalid token response: {}", e)))?;

        let token = token_data
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| GatewayError::auth("No access token in response"))?;

        let expires_at = match token_data.expires_at {
            Some(epoch) => DateTime::from_timestamp(epoch, 0)
                .ok_or_else(|| GatewayError::auth("Invalid expires_at in token response"))?,
            None => Utc::now() + Duration::seconds(DEFAULT_LIFETIME_SECS),
        };

        tracing::info!("Gateway access token refreshed, expires at {}", expires_at);

        Ok(Credential { token, expires_at })
    }
}
