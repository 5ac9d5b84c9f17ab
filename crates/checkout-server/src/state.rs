//! Application State

use std::sync::Arc;

use checkout_gateway::AirwallexClient;
use checkout_payments::{LogEvents, MemoryIntentStore, PaymentService, WebhookHandler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment orchestrator (real gateway + mock store)
    pub service: Arc<PaymentService<MemoryIntentStore>>,

    /// Gateway client, kept separately for the diagnostics endpoints
    pub gateway: Arc<AirwallexClient>,

    /// Webhook dispatcher
    pub webhooks: Arc<WebhookHandler<LogEvents>>,
}
