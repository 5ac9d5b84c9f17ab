//! Gateway Seam
//!
//! The trait implemented by payment provider clients. The orchestrator
//! only ever talks to a `dyn PaymentGateway`, so a stub implementation can
//! stand in for the real provider in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::intent::{Customer, PaymentIntent};

/// A product line item on an order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub quantity: u32,
    /// Unit price in the smallest currency unit (cents)
    pub unit_price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

/// Order details attached to an intent creation
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Order {
    pub products: Vec<Product>,
}

/// Request to create a payment intent at the gateway
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateIntentRequest {
    /// Idempotency token, unique per call
    pub request_id: String,

    /// Amount in the smallest currency unit (cents), must be positive
    pub amount: i64,

    /// Three-letter uppercase currency code
    pub currency: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_order_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

/// Payment gateway client
///
/// Implemented by the Airwallex client in `checkout-gateway` and by mock
/// gateways in tests.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payment intent. The returned intent always carries a
    /// non-empty client secret.
    async fn create_intent(&self, request: CreateIntentRequest) -> Result<PaymentIntent>;

    /// Confirm an intent with a payment method. Single attempt, no retry.
    async fn confirm_intent(
        &self,
        intent_id: &str,
        payment_method_id: &str,
    ) -> Result<PaymentIntent>;

    /// Fetch the current state of an intent. Single attempt, no retry.
    async fn get_intent(&self, intent_id: &str) -> Result<PaymentIntent>;

    /// Gateway name, for logs
    fn name(&self) -> &str;
}
