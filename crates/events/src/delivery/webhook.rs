//! Webhook delivery with exponential-backoff retry.
//!
//! [`WebhookDelivery`] POSTs a JSON [`WebhookEnvelope`] to a subscription's
//! URL. Failed attempts are retried three times with exponential backoff
//! (1 s, 2 s, 4 s). When the subscription has a secret, each attempt carries
//! an HMAC signature of its exact body.

use std::time::Duration;

use serde::Serialize;
use storehooks_core::event_names::WebhookEvent;
use storehooks_core::signing::{signature_header_value, SIGNATURE_HEADER};
use storehooks_core::types::Timestamp;
use uuid::Uuid;

use crate::notifier::NotificationPayload;
use crate::registry::WebhookSubscription;

/// Retry delays between attempts (exponential backoff: 1s, 2s, 4s).
pub const DEFAULT_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// HTTP request timeout for a single delivery attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to encode webhook body: {0}")]
    Encode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// JSON body of a single delivery attempt.
#[derive(Debug, Serialize)]
pub struct WebhookEnvelope<'a> {
    /// Stable across retries of the same notification.
    pub id: Uuid,
    /// 1-based attempt number.
    pub attempt: u32,
    pub event_type: WebhookEvent,
    pub payload: &'a NotificationPayload,
    pub timestamp: Timestamp,
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers notifications to external webhook endpoints.
pub struct WebhookDelivery {
    client: reqwest::Client,
    retry_delays: Vec<Duration>,
}

impl WebhookDelivery {
    /// Create a delivery service whose attempts time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            retry_delays: DEFAULT_RETRY_DELAYS.to_vec(),
        })
    }

    /// Replace the backoff schedule. An empty schedule means a single attempt.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.retry_delays.len() + 1
    }

    /// Deliver a notification to one subscription, retrying with backoff.
    ///
    /// Returns `Ok(())` on the first successful attempt, or the last error
    /// once every attempt has failed.
    pub async fn deliver(
        &self,
        subscription: &WebhookSubscription,
        event: WebhookEvent,
        payload: &NotificationPayload,
    ) -> Result<(), WebhookError> {
        let id = Uuid::new_v4();
        let timestamp = chrono::Utc::now();
        let url = subscription.url.as_str();

        let mut attempt: u32 = 1;
        let mut delays = self.retry_delays.iter();
        loop {
            let envelope = WebhookEnvelope {
                id,
                attempt,
                event_type: event,
                payload,
                timestamp,
            };
            let err = match self.try_send(subscription, &envelope).await {
                Ok(()) => {
                    tracing::debug!(url, event_type = %event, attempt, "Webhook delivered");
                    return Ok(());
                }
                Err(e) => e,
            };

            match delays.next() {
                Some(delay) => {
                    tracing::warn!(
                        attempt,
                        url,
                        event_type = %event,
                        error = %err,
                        "Webhook delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                    attempt += 1;
                }
                None => {
                    tracing::error!(
                        url,
                        event_type = %event,
                        error = %err,
                        "Webhook delivery failed after all retries"
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Execute a single POST request and check the response status.
    async fn try_send(
        &self,
        subscription: &WebhookSubscription,
        envelope: &WebhookEnvelope<'_>,
    ) -> Result<(), WebhookError> {
        let body = serde_json::to_vec(envelope)?;

        let mut request = self
            .client
            .post(&subscription.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(secret) = &subscription.secret {
            request = request.header(SIGNATURE_HEADER, signature_header_value(secret, &body));
        }

        let response = request.body(body).send().await?;
        if !response.status().is_success() {
            return Err(WebhookError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
