//! Error Types

use thiserror::Error;

/// Result type alias for payment operations
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment error taxonomy
///
/// Every failure surfaced to a caller carries one of these kinds. Secrets
/// (API keys, tokens, client secrets) must never appear in the messages;
/// use [`crate::preview`] when a hint is needed.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Missing or unusable configuration (e.g. gateway credentials)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied input rejected before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// All authentication strategies or retries exhausted
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The gateway answered, but the response is malformed
    #[error("Malformed gateway response: {0}")]
    Protocol(String),

    /// Network or HTTP failure not otherwise classified
    #[error("Transport error: {0}")]
    Transport(String),

    /// Unknown payment intent ID
    #[error("Payment intent not found: {0}")]
    NotFound(String),
}

impl PaymentError {
    /// Machine-readable error kind for API payloads
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::Config(_) => "CONFIG_ERROR",
            PaymentError::Validation(_) => "VALIDATION_ERROR",
            PaymentError::Authentication(_) => "AUTH_ERROR",
            PaymentError::Protocol(_) => "PROTOCOL_ERROR",
            PaymentError::Transport(_) => "TRANSPORT_ERROR",
            PaymentError::NotFound(_) => "NOT_FOUND",
        }
    }

    /// Check if the error is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentError::Transport(_) | PaymentError::Authentication(_)
        )
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Config(_) => "Payments are not configured on this server.".into(),
            PaymentError::Validation(msg) => format!("Invalid payment request: {}", msg),
            PaymentError::Authentication(_) => {
                "Could not authenticate with the payment provider. Please try again.".into()
            }
            PaymentError::Protocol(_) | PaymentError::Transport(_) => {
                "The payment provider is currently unavailable. Please try again.".into()
            }
            PaymentError::NotFound(_) => "Payment not found.".into(),
        }
    }
}
