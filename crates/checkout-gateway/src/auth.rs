//! Authentication Strategies
//!
//! The Airwallex sandbox has accepted credentials in different placements
//! over time (headers vs. body, and occasionally only on a fresh
//! connection). Rather than a single login call, authentication walks an
//! ordered chain of strategies and short-circuits on the first token.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use checkout_core::{preview, PaymentError, Result};

/// Everything a strategy needs to attempt a login
#[derive(Clone)]
pub struct AuthContext {
    /// Full URL of the login endpoint
    pub login_url: String,
    pub client_id: String,
    pub api_key: String,
    /// Shared pooled client
    pub http: reqwest::Client,
    /// Timeout applied when a strategy builds its own client
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    expires_at: Option<String>,
}

/// One way of presenting credentials to the login endpoint
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// Short human-readable description, for logs
    fn describe(&self) -> &'static str;

    /// Attempt a login. A non-empty token means success.
    async fn attempt(&self, ctx: &AuthContext) -> Result<String>;
}

/// How the credentials ride on the request
#[derive(Clone, Copy)]
enum CredentialPlacement {
    /// `x-client-id` / `x-api-key` headers with an empty JSON object body
    HeadersJsonBody,
    /// Same headers with an empty string body
    HeadersEmptyBody,
    /// `client_id` / `api_key` fields in the JSON body
    InBody,
}

async fn login(
    client: &reqwest::Client,
    ctx: &AuthContext,
    placement: CredentialPlacement,
) -> Result<String> {
    let request = client
        .post(&ctx.login_url)
        .header("Content-Type", "application/json");

    let request = match placement {
        CredentialPlacement::HeadersJsonBody => request
            .header("x-client-id", &ctx.client_id)
            .header("x-api-key", &ctx.api_key)
            .json(&serde_json::json!({})),
        CredentialPlacement::HeadersEmptyBody => request
            .header("x-client-id", &ctx.client_id)
            .header("x-api-key", &ctx.api_key)
            .body(""),
        CredentialPlacement::InBody => request.json(&serde_json::json!({
            "client_id": ctx.client_id,
            "api_key": ctx.api_key,
        })),
    };

    let response = request
        .send()
        .await
        .map_err(|e| PaymentError::Transport(format!("login request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PaymentError::Transport(format!(
            "login returned {}: {}",
            status, body
        )));
    }

    let parsed: TokenResponse = response
        .json()
        .await
        .map_err(|e| PaymentError::Protocol(format!("login response was not JSON: {}", e)))?;

    match parsed.token {
        Some(token) if !token.is_empty() => {
            tracing::debug!(expires_at = ?parsed.expires_at, "login token received");
            Ok(token)
        }
        _ => Err(PaymentError::Protocol("no token in login response".into())),
    }
}

/// A client with no shared connection pool, built per attempt
fn one_shot_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PaymentError::Transport(format!("could not build HTTP client: {}", e)))
}

struct HeadersJsonBody;

#[async_trait]
impl AuthStrategy for HeadersJsonBody {
    fn describe(&self) -> &'static str {
        "headers + empty JSON body"
    }

    async fn attempt(&self, ctx: &AuthContext) -> Result<String> {
        login(&ctx.http, ctx, CredentialPlacement::HeadersJsonBody).await
    }
}

struct HeadersEmptyBody;

#[async_trait]
impl AuthStrategy for HeadersEmptyBody {
    fn describe(&self) -> &'static str {
        "headers + empty string body"
    }

    async fn attempt(&self, ctx: &AuthContext) -> Result<String> {
        login(&ctx.http, ctx, CredentialPlacement::HeadersEmptyBody).await
    }
}

struct CredentialsInBody;

#[async_trait]
impl AuthStrategy for CredentialsInBody {
    fn describe(&self) -> &'static str {
        "credentials in body"
    }

    async fn attempt(&self, ctx: &AuthContext) -> Result<String> {
        login(&ctx.http, ctx, CredentialPlacement::InBody).await
    }
}

struct FreshHeadersJsonBody;

#[async_trait]
impl AuthStrategy for FreshHeadersJsonBody {
    fn describe(&self) -> &'static str {
        "headers + empty JSON body (fresh connection)"
    }

    async fn attempt(&self, ctx: &AuthContext) -> Result<String> {
        let client = one_shot_client(ctx.timeout)?;
        login(&client, ctx, CredentialPlacement::HeadersJsonBody).await
    }
}

struct FreshCredentialsInBody;

#[async_trait]
impl AuthStrategy for FreshCredentialsInBody {
    fn describe(&self) -> &'static str {
        "credentials in body (fresh connection)"
    }

    async fn attempt(&self, ctx: &AuthContext) -> Result<String> {
        let client = one_shot_client(ctx.timeout)?;
        login(&client, ctx, CredentialPlacement::InBody).await
    }
}

/// The fixed strategy order tried on every authentication
pub fn default_strategies() -> Vec<Box<dyn AuthStrategy>> {
    vec![
        Box::new(HeadersJsonBody),
        Box::new(HeadersEmptyBody),
        Box::new(CredentialsInBody),
        Box::new(FreshHeadersJsonBody),
        Box::new(FreshCredentialsInBody),
    ]
}

/// Walk the strategy chain in order, returning the first non-empty token.
///
/// Each attempt is logged with its index and outcome; the token itself is
/// only ever logged as a truncated preview. Exhausting the chain yields an
/// `Authentication` error carrying the last underlying failure.
pub async fn run_auth_strategies(
    strategies: &[Box<dyn AuthStrategy>],
    ctx: &AuthContext,
) -> Result<String> {
    let mut last_failure = String::from("no strategies configured");

    for (index, strategy) in strategies.iter().enumerate() {
        let method = index + 1;
        tracing::debug!(method, strategy = strategy.describe(), "trying auth method");

        match strategy.attempt(ctx).await {
            Ok(token) if !token.is_empty() => {
                tracing::info!(
                    method,
                    token_preview = %preview(&token),
                    token_len = token.len(),
                    "authentication succeeded"
                );
                return Ok(token);
            }
            Ok(_) => {
                tracing::warn!(method, "auth method returned an empty token");
                last_failure = format!("method {} returned an empty token", method);
            }
            Err(e) => {
                tracing::warn!(method, error = %e, "auth method failed");
                last_failure = e.to_string();
            }
        }
    }

    Err(PaymentError::Authentication(format!(
        "all {} authentication methods failed; last failure: {}",
        strategies.len(),
        last_failure
    )))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    struct Scripted {
        calls: Arc<AtomicUsize>,
        outcome: std::result::Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl AuthStrategy for Scripted {
        fn describe(&self) -> &'static str {
            "scripted"
        }

        async fn attempt(&self, _ctx: &AuthContext) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Ok(token) => Ok(token.to_string()),
                Err(msg) => Err(PaymentError::Transport(msg.into())),
            }
        }
    }

    fn test_ctx() -> AuthContext {
        AuthContext {
            login_url: "http://localhost/api/v1/authentication/login".into(),
            client_id: "client".into(),
            api_key: "key".into(),
            http: reqwest::Client::new(),
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_short_circuits_on_first_token() {
        let counters: Vec<Arc<AtomicUsize>> =
            (0..5).map(|_| Arc::new(AtomicUsize::new(0))).collect();

        let strategies: Vec<Box<dyn AuthStrategy>> = vec![
            Box::new(Scripted { calls: counters[0].clone(), outcome: Err("boom") }),
            Box::new(Scripted { calls: counters[1].clone(), outcome: Err("boom") }),
            Box::new(Scripted { calls: counters[2].clone(), outcome: Ok("tok_third") }),
            Box::new(Scripted { calls: counters[3].clone(), outcome: Ok("tok_fourth") }),
            Box::new(Scripted { calls: counters[4].clone(), outcome: Ok("tok_fifth") }),
        ];

        let token = run_auth_strategies(&strategies, &test_ctx()).await.unwrap();
        assert_eq!(token, "tok_third");

        assert_eq!(counters[0].load(Ordering::SeqCst), 1);
        assert_eq!(counters[1].load(Ordering::SeqCst), 1);
        assert_eq!(counters[2].load(Ordering::SeqCst), 1);
        // Later strategies are never tried
        assert_eq!(counters[3].load(Ordering::SeqCst), 0);
        assert_eq!(counters[4].load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_token_is_a_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategies: Vec<Box<dyn AuthStrategy>> = vec![
            Box::new(Scripted { calls: calls.clone(), outcome: Ok("") }),
            Box::new(Scripted { calls: calls.clone(), outcome: Ok("tok_second") }),
        ];

        let token = run_auth_strategies(&strategies, &test_ctx()).await.unwrap();
        assert_eq!(token, "tok_second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_carries_last_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let strategies: Vec<Box<dyn AuthStrategy>> = vec![
            Box::new(Scripted { calls: calls.clone(), outcome: Err("first failure") }),
            Box::new(Scripted { calls: calls.clone(), outcome: Err("last failure") }),
        ];

        let err = run_auth_strategies(&strategies, &test_ctx()).await.unwrap_err();
        match err {
            PaymentError::Authentication(msg) => {
                assert!(msg.contains("last failure"));
                assert!(msg.contains("2"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_default_strategy_order() {
        let strategies = default_strategies();
        assert_eq!(strategies.len(), 5);
        assert_eq!(strategies[0].describe(), "headers + empty JSON body");
        assert_eq!(strategies[2].describe(), "credentials in body");
        assert!(strategies[4].describe().contains("fresh connection"));
    }
}
