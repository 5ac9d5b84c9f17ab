//! Payment Intent Model
//!
//! The intent record mirrors what the gateway returns: a provider-issued
//! ID, the immutable amount/currency pair, a small monotonic status
//! lifecycle, and the client secret handed to the payer's browser.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ID prefix used by the in-process mock payment path.
///
/// Status lookups route on this prefix, so it must never collide with
/// provider-issued IDs.
pub const MOCK_INTENT_PREFIX: &str = "pi_mock";

/// Generate an identifier in the `prefix_timestamp_random` shape,
/// e.g. `req_1735689600000_a1b2c3d`.
pub fn generate_id(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let random: String = uuid::Uuid::new_v4().simple().to_string()[..7].to_string();
    format!("{}_{}_{}", prefix, millis, random)
}

/// Check whether an intent ID belongs to the mock payment path
pub fn is_mock_id(id: &str) -> bool {
    id.starts_with(MOCK_INTENT_PREFIX)
        && id.len() > MOCK_INTENT_PREFIX.len()
        && id.as_bytes()[MOCK_INTENT_PREFIX.len()] == b'_'
}

/// Truncated preview of a sensitive value, safe to log
pub fn preview(secret: &str) -> String {
    let head: String = secret.chars().take(10).collect();
    if secret.chars().count() > 10 {
        format!("{}...", head)
    } else {
        head
    }
}

/// Payment intent status lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStatus {
    Created,
    Succeeded,
    Failed,
    Cancelled,
}

impl IntentStatus {
    /// Normalize a provider-reported status string.
    ///
    /// Intermediate provider states (`REQUIRES_PAYMENT_METHOD`,
    /// `REQUIRES_CUSTOMER_ACTION`, ...) all map to `Created`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "succeeded" => IntentStatus::Succeeded,
            "failed" => IntentStatus::Failed,
            "cancelled" | "canceled" => IntentStatus::Cancelled,
            _ => IntentStatus::Created,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::Created => "created",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Failed => "failed",
            IntentStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states never transition again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IntentStatus::Created)
    }

    /// Whether a transition to `next` is legal.
    ///
    /// The lifecycle is monotonic: nothing ever moves back to `Created`,
    /// and terminal states only "transition" to themselves.
    pub fn can_advance(&self, next: IntentStatus) -> bool {
        if *self == next {
            return true;
        }
        !self.is_terminal() && next != IntentStatus::Created
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Opaque client secret returned by the gateway.
///
/// Serialized in full on the wire (the payer's browser needs it), but
/// `Debug`/`Display` only ever render a truncated preview so it cannot
/// leak through logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientSecret(String);

impl ClientSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The full secret value
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClientSecret({})", preview(&self.0))
    }
}

impl std::fmt::Display for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", preview(&self.0))
    }
}

/// Customer details attached to an intent
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// A payment intent record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Provider-issued (or mock-generated) identifier, immutable
    pub id: String,

    /// Client-generated idempotency token
    pub request_id: String,

    /// Amount in the smallest currency unit (cents)
    pub amount: i64,

    /// Three-letter uppercase currency code
    pub currency: String,

    /// Merchant order identifier, generated per creation
    pub merchant_order_id: String,

    /// Current lifecycle status
    pub status: IntentStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,

    /// Opaque token the payer's client uses to complete checkout
    pub client_secret: ClientSecret,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentIntent {
    /// Advance the status, refreshing `updated_at` on change.
    ///
    /// Illegal transitions (anything out of a terminal state, or back to
    /// `Created`) are ignored. Returns whether the status changed.
    pub fn advance(&mut self, next: IntentStatus) -> bool {
        if next == self.status || !self.status.can_advance(next) {
            return false;
        }
        self.status = next;
        self.updated_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_intent() -> PaymentIntent {
        PaymentIntent {
            id: generate_id(MOCK_INTENT_PREFIX),
            request_id: generate_id("req"),
            amount: 2500,
            currency: "USD".into(),
            merchant_order_id: generate_id("order"),
            status: IntentStatus::Created,
            customer: None,
            client_secret: ClientSecret::new("mock_secret_abcdef123456"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_id_shape() {
        let id = generate_id("req");
        let parts: Vec<&str> = id.splitn(3, '_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "req");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 7);
    }

    #[test]
    fn test_mock_id_recognition() {
        assert!(is_mock_id(&generate_id(MOCK_INTENT_PREFIX)));
        assert!(!is_mock_id("int_hkdm78sh9wz"));
        assert!(!is_mock_id("pi_mockery"));
    }

    #[test]
    fn test_id_uniqueness() {
        let a = generate_id("req");
        let b = generate_id("req");
        assert_ne!(a, b);
    }

    #[test]
    fn test_status_monotonic() {
        assert!(IntentStatus::Created.can_advance(IntentStatus::Succeeded));
        assert!(IntentStatus::Created.can_advance(IntentStatus::Failed));
        assert!(!IntentStatus::Succeeded.can_advance(IntentStatus::Created));
        assert!(!IntentStatus::Succeeded.can_advance(IntentStatus::Failed));
        assert!(IntentStatus::Succeeded.can_advance(IntentStatus::Succeeded));
    }

    #[test]
    fn test_advance_refreshes_updated_at() {
        let mut intent = sample_intent();
        let before = intent.updated_at;
        assert!(intent.advance(IntentStatus::Succeeded));
        assert!(intent.updated_at >= before);
        // Illegal transition is a no-op
        assert!(!intent.advance(IntentStatus::Created));
        assert_eq!(intent.status, IntentStatus::Succeeded);
    }

    #[test]
    fn test_secret_debug_redacted() {
        let secret = ClientSecret::new("mock_secret_abcdef1234567890");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("abcdef1234567890"));
        assert!(debug.contains("..."));
    }

    #[test]
    fn test_preview_short_values() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview("exactly10!"), "exactly10!");
        assert_eq!(preview("longer-than-ten"), "longer-tha...");
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(IntentStatus::parse("SUCCEEDED"), IntentStatus::Succeeded);
        assert_eq!(IntentStatus::parse("cancelled"), IntentStatus::Cancelled);
        assert_eq!(
            IntentStatus::parse("REQUIRES_PAYMENT_METHOD"),
            IntentStatus::Created
        );
    }
}
