//! Gateway Webhook Handling
//!
//! Parses Airwallex webhook payloads (`{name, data: {object}}`) and
//! dispatches on the event name. Signature verification is not performed;
//! payloads are trusted as received.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use checkout_core::{PaymentError, Result};

/// Lenient view of the intent object carried by a webhook event.
///
/// Providers evolve this shape; only the fields we act on are parsed and
/// all of them are optional.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WebhookIntent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    name: String,
    #[serde(default)]
    data: Option<WebhookData>,
}

#[derive(Debug, Deserialize)]
struct WebhookData {
    #[serde(default)]
    object: Option<WebhookIntent>,
}

/// Parsed webhook event
#[derive(Clone, Debug)]
pub enum WebhookEvent {
    PaymentSucceeded { intent: WebhookIntent },
    PaymentFailed { intent: WebhookIntent },
    PaymentCancelled { intent: WebhookIntent },
    /// Unhandled event type
    Other { event_type: String },
}

impl WebhookEvent {
    /// Parse a raw webhook body
    pub fn parse(payload: &str) -> Result<Self> {
        let payload: WebhookPayload = serde_json::from_str(payload)
            .map_err(|e| PaymentError::Validation(format!("invalid webhook payload: {}", e)))?;

        let intent = payload
            .data
            .and_then(|d| d.object)
            .unwrap_or_default();

        Ok(match payload.name.as_str() {
            "payment_intent.succeeded" => WebhookEvent::PaymentSucceeded { intent },
            "payment_intent.payment_failed" => WebhookEvent::PaymentFailed { intent },
            "payment_intent.cancelled" => WebhookEvent::PaymentCancelled { intent },
            _ => WebhookEvent::Other {
                event_type: payload.name,
            },
        })
    }
}

/// Side effects triggered by webhook events.
///
/// The server wires in [`LogEvents`]; anything that needs to update a
/// database or send email implements this instead.
pub trait PaymentEvents: Send + Sync {
    fn on_succeeded(&self, intent: &WebhookIntent);
    fn on_failed(&self, intent: &WebhookIntent);
    fn on_cancelled(&self, intent: &WebhookIntent);
}

/// Default sink that only traces
pub struct LogEvents;

impl PaymentEvents for LogEvents {
    fn on_succeeded(&self, intent: &WebhookIntent) {
        tracing::info!(intent_id = ?intent.id, "payment succeeded");
    }

    fn on_failed(&self, intent: &WebhookIntent) {
        tracing::warn!(intent_id = ?intent.id, "payment failed");
    }

    fn on_cancelled(&self, intent: &WebhookIntent) {
        tracing::info!(intent_id = ?intent.id, "payment cancelled");
    }
}

/// Webhook handler
pub struct WebhookHandler<E: PaymentEvents> {
    events: Arc<E>,
}

impl<E: PaymentEvents> WebhookHandler<E> {
    pub fn new(events: Arc<E>) -> Self {
        Self { events }
    }

    /// Parse a payload and run the matching side effect.
    ///
    /// Unrecognized event names are logged and succeed as no-ops.
    pub fn handle(&self, payload: &str) -> Result<WebhookEvent> {
        let event = WebhookEvent::parse(payload)?;

        match &event {
            WebhookEvent::PaymentSucceeded { intent } => self.events.on_succeeded(intent),
            WebhookEvent::PaymentFailed { intent } => self.events.on_failed(intent),
            WebhookEvent::PaymentCancelled { intent } => self.events.on_cancelled(intent),
            WebhookEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "unhandled webhook event");
            }
        }

        Ok(event)
    }
}
