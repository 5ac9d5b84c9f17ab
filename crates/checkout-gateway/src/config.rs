//! Gateway Configuration

use std::time::Duration;

use checkout_core::{PaymentError, Result};

const DEFAULT_BASE_URL: &str = "https://api-demo.airwallex.com";

/// Retry behavior for token acquisition during intent creation.
///
/// Explicit values rather than hard-coded literals so tests can run with
/// near-zero delay.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Maximum authentication attempts
    pub attempts: u32,

    /// Fixed delay between attempts (no backoff, no jitter)
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Airwallex client configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// API base URL
    pub base_url: String,

    /// Client identifier; absence is a configuration error at call time
    pub client_id: Option<String>,

    /// API key; absence is a configuration error at call time
    pub api_key: Option<String>,

    /// Bound on every outbound call
    pub timeout: Duration,

    /// Auth retry policy for intent creation
    pub auth_retry: RetryPolicy,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            client_id: None,
            api_key: None,
            timeout: Duration::from_secs(15),
            auth_retry: RetryPolicy::default(),
        }
    }
}

impl GatewayConfig {
    /// Read configuration from environment variables.
    ///
    /// Never fails: missing credentials surface as a `Config` error when
    /// an operation actually needs them, not at startup.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("AIRWALLEX_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        Self {
            base_url,
            client_id: std::env::var("AIRWALLEX_CLIENT_ID").ok().filter(|v| !v.is_empty()),
            api_key: std::env::var("AIRWALLEX_API_KEY").ok().filter(|v| !v.is_empty()),
            ..Default::default()
        }
    }

    /// Whether both credential values are present
    pub fn has_credentials(&self) -> bool {
        self.client_id.is_some() && self.api_key.is_some()
    }

    /// Credentials, or a `Config` error naming the missing variables
    pub fn credentials(&self) -> Result<(&str, &str)> {
        match (self.client_id.as_deref(), self.api_key.as_deref()) {
            (Some(id), Some(key)) => Ok((id, key)),
            _ => Err(PaymentError::Config(
                "missing Airwallex credentials: set AIRWALLEX_CLIENT_ID and AIRWALLEX_API_KEY"
                    .into(),
            )),
        }
    }
}
