//! HTTP Handlers

use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use checkout_core::{is_mock_id, preview, IntentStatus, PaymentError, PaymentIntent};
use checkout_gateway::GatewayConfig;
use checkout_payments::CheckoutRequest;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub gateway_configured: bool,
    pub demo_fallback: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Serialize)]
pub struct CreateIntentResponse {
    pub success: bool,
    pub payment_intent: PaymentIntent,
    pub client_secret: String,
}

#[derive(Serialize)]
pub struct PaymentResponse {
    pub success: bool,
    pub payment: PaymentIntent,
    pub status: IntentStatus,
}

#[derive(Serialize)]
pub struct MockPaymentResponse {
    pub success: bool,
    pub payment_intent: PaymentIntent,
    pub client_secret: String,
    pub mock: bool,
    pub checkout_url: String,
}

#[derive(Serialize)]
pub struct MockStatusResponse {
    pub success: bool,
    pub payment_intent: PaymentIntent,
    pub mock: bool,
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(serde::Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub payment_intent_id: String,
    #[serde(default)]
    pub payment_method_id: String,
}

/// Credential presence summary — never the values themselves
#[derive(Serialize)]
pub struct ConfigSummary {
    pub base_url: String,
    pub has_client_id: bool,
    pub has_api_key: bool,
    pub client_id_length: usize,
    pub api_key_length: usize,
}

impl ConfigSummary {
    fn from_config(config: &GatewayConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            has_client_id: config.client_id.is_some(),
            has_api_key: config.api_key.is_some(),
            client_id_length: config.client_id.as_deref().map_or(0, str::len),
            api_key_length: config.api_key.as_deref().map_or(0, str::len),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(err: &PaymentError) -> ApiError {
    let status = match err {
        PaymentError::Validation(_) => StatusCode::BAD_REQUEST,
        PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
        PaymentError::Config(_) => StatusCode::SERVICE_UNAVAILABLE,
        PaymentError::Authentication(_) | PaymentError::Protocol(_) | PaymentError::Transport(_) => {
            StatusCode::BAD_GATEWAY
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code: err.code().into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        gateway_configured: state.gateway.config().has_credentials(),
        demo_fallback: state.service.demo_fallback(),
    })
}

/// Create a payment intent at the gateway
pub async fn create_intent(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CreateIntentResponse>, ApiError> {
    let intent = state.service.create(payload).await.map_err(|e| {
        tracing::error!(error = %e, "payment intent creation failed");
        error_response(&e)
    })?;

    let client_secret = intent.client_secret.expose().to_string();
    Ok(Json(CreateIntentResponse {
        success: true,
        payment_intent: intent,
        client_secret,
    }))
}

/// Confirm a payment intent with a payment method
pub async fn confirm_payment(
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let intent = state
        .service
        .confirm(&payload.payment_intent_id, &payload.payment_method_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, intent_id = %payload.payment_intent_id, "confirmation failed");
            error_response(&e)
        })?;

    let status = intent.status;
    Ok(Json(PaymentResponse {
        success: true,
        payment: intent,
        status,
    }))
}

/// Current intent status, routed by ID prefix in the orchestrator
pub async fn payment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let intent = state.service.status(&id).await.map_err(|e| {
        tracing::warn!(error = %e, intent_id = %id, "status check failed");
        error_response(&e)
    })?;

    let status = intent.status;
    Ok(Json(PaymentResponse {
        success: true,
        payment: intent,
        status,
    }))
}

/// Create a mock payment intent, stored in-process for later polling
pub async fn mock_payment(
    State(state): State<AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<MockPaymentResponse>, ApiError> {
    let intent = state.service.create_mock(payload).map_err(|e| error_response(&e))?;

    let client_secret = intent.client_secret.expose().to_string();
    let checkout_url = format!("/api/payment/mock-status/{}", intent.id);
    Ok(Json(MockPaymentResponse {
        success: true,
        payment_intent: intent,
        client_secret,
        mock: true,
        checkout_url,
    }))
}

/// Status poll for a mock intent; foreign IDs are rejected outright
pub async fn mock_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MockStatusResponse>, ApiError> {
    if !is_mock_id(&id) {
        return Err(error_response(&PaymentError::Validation(
            "not a mock payment ID".into(),
        )));
    }

    let intent = state.service.status(&id).await.map_err(|e| error_response(&e))?;
    Ok(Json(MockStatusResponse {
        success: true,
        payment_intent: intent,
        mock: true,
    }))
}

/// Airwallex webhook receiver.
///
/// No signature verification is performed on the payload.
pub async fn airwallex_webhook(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<WebhookResponse>, ApiError> {
    let event = state.webhooks.handle(&body).map_err(|e| {
        tracing::warn!(error = %e, "webhook rejected");
        error_response(&e)
    })?;

    tracing::debug!(event = ?event, "webhook processed");
    Ok(Json(WebhookResponse {
        success: true,
        message: "Webhook processed successfully",
    }))
}

#[derive(Serialize)]
pub struct TestAuthResponse {
    pub success: bool,
    pub message: &'static str,
    pub token_preview: String,
    pub token_length: usize,
    pub elapsed_ms: u128,
    pub environment: ConfigSummary,
}

/// Diagnostics: run the full authentication chain and report timing.
///
/// Only a token preview ever leaves the server.
pub async fn test_auth(
    State(state): State<AppState>,
) -> Result<Json<TestAuthResponse>, ApiError> {
    let started = Instant::now();
    let token = state.gateway.authenticate().await.map_err(|e| {
        tracing::warn!(error = %e, "auth diagnostics failed");
        error_response(&e)
    })?;
    let elapsed = started.elapsed();

    tracing::info!(elapsed_ms = elapsed.as_millis(), "auth diagnostics succeeded");
    Ok(Json(TestAuthResponse {
        success: true,
        message: "Authentication successful",
        token_preview: preview(&token),
        token_length: token.len(),
        elapsed_ms: elapsed.as_millis(),
        environment: ConfigSummary::from_config(state.gateway.config()),
    }))
}

#[derive(Serialize)]
pub struct TestConfigResponse {
    pub success: bool,
    #[serde(flatten)]
    pub environment: ConfigSummary,
}

/// Diagnostics: credential presence and lengths, never values
pub async fn test_config(State(state): State<AppState>) -> Json<TestConfigResponse> {
    Json(TestConfigResponse {
        success: true,
        environment: ConfigSummary::from_config(state.gateway.config()),
    })
}
