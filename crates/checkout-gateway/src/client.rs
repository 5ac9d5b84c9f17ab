//! Airwallex Client
//!
//! Implements `PaymentGateway` against the Airwallex payment acceptance
//! API (v1): authenticate, create, confirm, and fetch payment intents.

use std::future::Future;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use checkout_core::{
    preview, ClientSecret, CreateIntentRequest, Customer, IntentStatus, PaymentError,
    PaymentGateway, PaymentIntent, Result,
};

use crate::auth::{default_strategies, run_auth_strategies, AuthContext, AuthStrategy};
use crate::config::{GatewayConfig, RetryPolicy};

// API paths per the Airwallex documentation (v=2021-02-28)
const API_AUTHENTICATION: &str = "/api/v1/authentication/login";
const API_INTENTS_CREATE: &str = "/api/v1/pa/payment_intents/create";

fn confirm_path(intent_id: &str) -> String {
    format!("/api/v1/pa/payment_intents/{}/confirm", intent_id)
}

fn intent_path(intent_id: &str) -> String {
    format!("/api/v1/pa/payment_intents/{}", intent_id)
}

/// Acquire a token with a fixed-count, fixed-delay retry loop.
///
/// Non-retryable failures (missing configuration) surface immediately;
/// exhaustion surfaces as `Authentication` carrying the last error.
pub async fn acquire_token_with_retry<F, Fut>(policy: &RetryPolicy, mut authenticate: F) -> Result<String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let mut last_error =
        PaymentError::Authentication("no authentication attempts configured".into());

    for attempt in 1..=policy.attempts {
        match authenticate().await {
            Ok(token) => {
                if attempt > 1 {
                    tracing::info!(attempt, "obtained auth token after retry");
                }
                return Ok(token);
            }
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                tracing::warn!(attempt, error = %e, "authentication attempt failed");
                last_error = e;
                if attempt < policy.attempts {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }

    Err(PaymentError::Authentication(format!(
        "{} authentication attempts exhausted; last error: {}",
        policy.attempts, last_error
    )))
}

/// Wire shape of an Airwallex payment intent
#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    amount: Option<i64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    merchant_order_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    customer: Option<Customer>,
    #[serde(default)]
    client_secret: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl IntentResponse {
    fn into_intent(self) -> PaymentIntent {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        PaymentIntent {
            id: self.id,
            request_id: self.request_id.unwrap_or_default(),
            amount: self.amount.unwrap_or_default(),
            currency: self.currency.unwrap_or_default(),
            merchant_order_id: self.merchant_order_id.unwrap_or_default(),
            status: self
                .status
                .as_deref()
                .map_or(IntentStatus::Created, IntentStatus::parse),
            customer: self.customer,
            client_secret: ClientSecret::new(self.client_secret.unwrap_or_default()),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

async fn error_from_response(operation: &'static str, response: reqwest::Response) -> PaymentError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    match status {
        StatusCode::UNAUTHORIZED => PaymentError::Authentication(format!(
            "{}: gateway rejected the token (401)",
            operation
        )),
        StatusCode::BAD_REQUEST => PaymentError::Validation(format!(
            "{}: gateway rejected the request: {}",
            operation, body
        )),
        StatusCode::NOT_FOUND => {
            PaymentError::NotFound(format!("{}: intent not found at gateway", operation))
        }
        _ => PaymentError::Transport(format!(
            "{} failed with status {}: {}",
            operation, status, body
        )),
    }
}

/// Airwallex API client
pub struct AirwallexClient {
    http: reqwest::Client,
    config: GatewayConfig,
    strategies: Vec<Box<dyn AuthStrategy>>,
}

impl AirwallexClient {
    /// Create a client. Credentials may be absent; operations that need
    /// them fail with a `Config` error at call time.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Config(format!("could not build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            config,
            strategies: default_strategies(),
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn auth_context(&self) -> Result<AuthContext> {
        let (client_id, api_key) = self.config.credentials()?;
        Ok(AuthContext {
            login_url: format!("{}{}", self.config.base_url, API_AUTHENTICATION),
            client_id: client_id.to_string(),
            api_key: api_key.to_string(),
            http: self.http.clone(),
            timeout: self.config.timeout,
        })
    }

    /// Obtain a bearer token, walking the strategy chain.
    ///
    /// Fails fast with `Config` when credentials are missing; no network
    /// call is made in that case. Tokens are not cached.
    pub async fn authenticate(&self) -> Result<String> {
        let ctx = self.auth_context()?;
        tracing::debug!(
            base_url = %self.config.base_url,
            client_id_preview = %preview(&ctx.client_id),
            "authenticating with gateway"
        );
        run_auth_strategies(&self.strategies, &ctx).await
    }
}

#[async_trait::async_trait]
impl PaymentGateway for AirwallexClient {
    async fn create_intent(&self, request: CreateIntentRequest) -> Result<PaymentIntent> {
        if request.amount <= 0 {
            return Err(PaymentError::Validation(
                "amount must be a positive number of cents".into(),
            ));
        }
        if request.currency.trim().is_empty() {
            return Err(PaymentError::Validation("currency is required".into()));
        }
        if request.request_id.trim().is_empty() {
            return Err(PaymentError::Validation("request_id is required".into()));
        }

        let token =
            acquire_token_with_retry(&self.config.auth_retry, || self.authenticate()).await?;

        let url = format!("{}{}", self.config.base_url, API_INTENTS_CREATE);
        tracing::debug!(
            request_id = %request.request_id,
            amount = request.amount,
            currency = %request.currency,
            "creating payment intent"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&request)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(format!("create request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response("create", response).await);
        }

        let body: IntentResponse = response.json().await.map_err(|e| {
            PaymentError::Protocol(format!("create response was not valid JSON: {}", e))
        })?;

        if body.client_secret.as_deref().unwrap_or("").is_empty() {
            return Err(PaymentError::Protocol(
                "create response missing client_secret".into(),
            ));
        }

        let intent = body.into_intent();
        tracing::info!(intent_id = %intent.id, status = %intent.status, "payment intent created");
        Ok(intent)
    }

    async fn confirm_intent(
        &self,
        intent_id: &str,
        payment_method_id: &str,
    ) -> Result<PaymentIntent> {
        let token = self.authenticate().await?;

        let url = format!("{}{}", self.config.base_url, confirm_path(intent_id));
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&serde_json::json!({ "payment_method_id": payment_method_id }))
            .send()
            .await
            .map_err(|e| PaymentError::Transport(format!("confirm request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response("confirm", response).await);
        }

        let body: IntentResponse = response.json().await.map_err(|e| {
            PaymentError::Protocol(format!("confirm response was not valid JSON: {}", e))
        })?;

        let intent = body.into_intent();
        tracing::info!(intent_id = %intent.id, status = %intent.status, "payment intent confirmed");
        Ok(intent)
    }

    async fn get_intent(&self, intent_id: &str) -> Result<PaymentIntent> {
        let token = self.authenticate().await?;

        let url = format!("{}{}", self.config.base_url, intent_path(intent_id));
        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| PaymentError::Transport(format!("status request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response("status", response).await);
        }

        let body: IntentResponse = response.json().await.map_err(|e| {
            PaymentError::Protocol(format!("status response was not valid JSON: {}", e))
        })?;

        Ok(body.into_intent())
    }

    fn name(&self) -> &str {
        "airwallex"
    }
}
