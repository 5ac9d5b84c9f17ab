//! site-checkout HTTP Server
//!
//! Axum-based server exposing the payment API behind the marketing site's
//! checkout form: intent creation, confirmation, and status polling
//! against Airwallex, a mock payment path for demos, and the gateway
//! webhook receiver.

mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_gateway::AirwallexClient;
use checkout_payments::{LogEvents, MemoryIntentStore, PaymentService, WebhookHandler};

use crate::handlers::{
    airwallex_webhook, confirm_payment, create_intent, health_check, mock_payment, mock_status,
    payment_status, test_auth, test_config,
};
use crate::state::AppState;

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    // Initialize gateway client. Missing credentials are not fatal here:
    // real payment operations fail with a configuration error at call
    // time, while the mock path keeps working.
    let gateway = Arc::new(AirwallexClient::from_env()?);
    if gateway.config().has_credentials() {
        tracing::info!("✓ Airwallex configured ({})", gateway.config().base_url);
    } else {
        tracing::warn!("⚠ Airwallex not configured - real payments disabled");
        tracing::warn!("  Set AIRWALLEX_CLIENT_ID and AIRWALLEX_API_KEY in .env");
    }

    let demo_fallback = env_flag("PAYMENTS_DEMO_FALLBACK");
    if demo_fallback {
        tracing::warn!("⚠ Demo fallback enabled - status-check failures report succeeded");
    }

    // Build orchestrator and webhook dispatcher
    let store = Arc::new(MemoryIntentStore::new());
    let gateway_dyn: Arc<dyn checkout_core::PaymentGateway> = gateway.clone();
    let service =
        Arc::new(PaymentService::new(Some(gateway_dyn), store).with_demo_fallback(demo_fallback));
    let webhooks = Arc::new(WebhookHandler::new(Arc::new(LogEvents)));

    let state = AppState {
        service,
        gateway,
        webhooks,
    };

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health & diagnostics
        .route("/health", get(health_check))
        .route("/api/test-config", get(test_config))
        .route("/api/payment/test-auth", get(test_auth))
        // Payments
        .route("/api/payment/create-intent", post(create_intent))
        .route("/api/payment/confirm", post(confirm_payment))
        .route("/api/payment/status/{id}", get(payment_status))
        // Mock payments
        .route("/api/payment/mock-payment", post(mock_payment))
        .route("/api/payment/mock-status/{id}", get(mock_status))
        // Webhooks
        .route("/api/webhooks/airwallex", post(airwallex_webhook))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 checkout server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                        - Health check");
    tracing::info!("  POST /api/payment/create-intent     - Create payment intent");
    tracing::info!("  POST /api/payment/confirm           - Confirm payment");
    tracing::info!("  GET  /api/payment/status/{{id}}       - Payment status");
    tracing::info!("  POST /api/payment/mock-payment      - Create mock intent");
    tracing::info!("  GET  /api/payment/mock-status/{{id}}  - Mock payment status");
    tracing::info!("  POST /api/webhooks/airwallex        - Gateway webhooks");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
