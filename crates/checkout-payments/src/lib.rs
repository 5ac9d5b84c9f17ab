//! # checkout-payments
//!
//! The orchestration layer callers interact with: input validation,
//! real-vs-mock routing, and response shaping sit in [`PaymentService`];
//! the mock path persists intents in an [`IntentStore`]; webhook events
//! from the gateway are parsed and dispatched in [`webhook`].

mod service;
mod store;
pub mod webhook;

pub use service::{CheckoutRequest, PaymentService};
pub use store::{IntentStore, MemoryIntentStore};
pub use webhook::{LogEvents, PaymentEvents, WebhookEvent, WebhookHandler, WebhookIntent};
