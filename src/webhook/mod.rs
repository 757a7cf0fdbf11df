//! Webhook verification and processing
//!
//! Inbound gateway deliveries pass through [`WebhookProcessor`]: parse the
//! JSON envelope, verify the `SHA256` signature against the raw body, then
//! dispatch the event. Unrecognized event types are acknowledged without
//! dispatch so the gateway does not redeliver them; only an unparseable body
//! or a bad signature is rejected.
//!
//! # Examples
//!
//! ```
//! use phonepe_gateway::store::InMemoryStore;
//! use phonepe_gateway::webhook::WebhookProcessor;
//! use sha2::{Digest, Sha256};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let processor = WebhookProcessor::new("whsec", Arc::new(InMemoryStore::new()));
//!
//! let body = br#"{"event":"settlement.initiated","payload":{"settlementId":"S1"}}"#;
//! let mut hasher = Sha256::new();
//! hasher.update(body);
//! hasher.update(b"whsec");
//! let header = format!("SHA256 {}", hex::encode(hasher.finalize()));
//!
//! let ack = processor.process(Some(&header), body).await.unwrap();
//! assert_eq!(ack.status, "success");
//! # }
//! ```

use crate::store::PaymentStore;
use crate::types::{EventType, WebhookAck, WebhookEnvelope};
use std::fmt;
use std::sync::Arc;

pub mod dispatch;
pub mod verifier;

pub use dispatch::EventDispatcher;
pub use verifier::WebhookVerifier;


/// Why a webhook delivery was refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookRejection {
    /// Body is not valid JSON or not a valid envelope
    InvalidPayload,
    /// Signature header missing, malformed, or not matching the body
    InvalidSignature,
}

impl WebhookRejection {
    /// HTTP status code this rejection maps to
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidPayload => 400,
            Self::InvalidSignature => 401,
        }
    }
}

impl fmt::Display for WebhookRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPayload => f.write_str("Invalid JSON payload"),
            Self::InvalidSignature => f.write_str("Invalid webhook signature"),
        }
    }
}

/// End-to-end webhook processing: verify, parse, dispatch, acknowledge
#[derive(Clone)]
pub struct WebhookProcessor {
    verifier: WebhookVerifier,
    dispatcher: EventDispatcher,
}

impl WebhookProcessor {
    /// Create a processor with the shared secret and persistence backend
    pub fn new(secret: impl Into<String>, store: Arc<dyn PaymentStore>) -> Self {
        Self {
            verifier: WebhookVerifier::new(secret),
            dispatcher: EventDispatcher::new(store),
        }
    }

    /// Process one delivery
    ///
    /// `auth_header` is the raw `Authorization` header, `body` the unparsed
    /// request body the signature covers. Returns the acknowledgment to send
    /// with HTTP 200, or a rejection with its status code. Handler and store
    /// failures do not surface here; a verified delivery is always
    /// acknowledged.
    pub async fn process(
        &self,
        auth_header: Option<&str>,
        body: &[u8],
    ) -> Result<WebhookAck, WebhookRejection> {
        let envelope: WebhookEnvelope = serde_json::from_slice(body).map_err(|e| {
            tracing::error!("Invalid JSON in webhook: {}", e);
            WebhookRejection::InvalidPayload
        })?;

        if !self.verifier.verify(auth_header.unwrap_or(""), body) {
            tracing::error!("Webhook signature verification failed");
            return Err(WebhookRejection::InvalidSignature);
        }

        tracing::info!("Processing webhook event: {}", envelope.event);

        match EventType::parse(&envelope.event) {
            Some(event) => {
                self.dispatcher.dispatch(event, &envelope.payload).await;
                tracing::info!("Successfully processed webhook event: {}", envelope.event);
            }
            None => {
                // Acknowledge anyway so the gateway does not retry
                tracing::warn!("Unknown webhook event type: {}", envelope.event);
            }
        }

        Ok(WebhookAck::processed(envelope.event, envelope.timestamp))
    }
}
