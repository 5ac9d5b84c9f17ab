//! Payment Orchestrator
//!
//! The only component handlers call into. Validates input, converts
//! user-facing decimal amounts to cents, selects the real gateway or the
//! mock path, and normalizes the result.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use checkout_core::{
    generate_id, is_mock_id, ClientSecret, CreateIntentRequest, Customer, IntentStatus, Order,
    PaymentError, PaymentGateway, PaymentIntent, Product, Result, MOCK_INTENT_PREFIX,
};

use crate::store::IntentStore;

/// Checkout creation request, as posted by the payment form
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Decimal amount in major units (e.g. dollars)
    #[serde(default)]
    pub amount: Option<Decimal>,

    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub customer_email: Option<String>,

    /// Full name, split on the first whitespace into first/last
    #[serde(default)]
    pub customer_name: Option<String>,

    #[serde(default)]
    pub order_details: Option<Vec<Product>>,
}

fn split_name(name: Option<&str>) -> (String, String) {
    match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(full) => match full.split_once(char::is_whitespace) {
            Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
            None => (full.to_string(), String::new()),
        },
        None => ("Guest".into(), "Customer".into()),
    }
}

/// Validated creation input: amount in cents plus normalized currency
fn validate(request: &CheckoutRequest) -> Result<(i64, String)> {
    let amount = request
        .amount
        .ok_or_else(|| PaymentError::Validation("amount is required".into()))?;
    if amount <= Decimal::ZERO {
        return Err(PaymentError::Validation(
            "amount must be a positive number".into(),
        ));
    }

    let currency = request
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| PaymentError::Validation("currency is required".into()))?;

    let cents = (amount * dec!(100))
        .round()
        .to_i64()
        .ok_or_else(|| PaymentError::Validation("amount out of range".into()))?;

    Ok((cents, currency.to_uppercase()))
}

fn default_order(cents: i64) -> Order {
    Order {
        products: vec![Product {
            name: "IT Consulting Service".into(),
            quantity: 1,
            unit_price: cents,
            desc: Some("Professional IT consulting services".into()),
        }],
    }
}

/// Payment orchestrator
pub struct PaymentService<S: IntentStore> {
    gateway: Option<Arc<dyn PaymentGateway>>,
    store: Arc<S>,
    demo_fallback: bool,
}

impl<S: IntentStore> PaymentService<S> {
    /// A service without a gateway serves only the mock path; real
    /// operations fail with a `Config` error.
    pub fn new(gateway: Option<Arc<dyn PaymentGateway>>, store: Arc<S>) -> Self {
        Self {
            gateway,
            store,
            demo_fallback: false,
        }
    }

    /// Opt in to masking gateway failures on status checks with a
    /// synthetic `succeeded` result. Off by default: real errors surface.
    pub fn with_demo_fallback(mut self, enabled: bool) -> Self {
        self.demo_fallback = enabled;
        self
    }

    pub fn demo_fallback(&self) -> bool {
        self.demo_fallback
    }

    pub fn gateway_configured(&self) -> bool {
        self.gateway.is_some()
    }

    fn gateway(&self) -> Result<&Arc<dyn PaymentGateway>> {
        self.gateway
            .as_ref()
            .ok_or_else(|| PaymentError::Config("no payment gateway configured".into()))
    }

    /// Create a payment intent at the gateway
    pub async fn create(&self, request: CheckoutRequest) -> Result<PaymentIntent> {
        let (cents, currency) = validate(&request)?;
        let gateway = self.gateway()?;

        let (first_name, last_name) = split_name(request.customer_name.as_deref());
        let customer = Customer {
            email: request.customer_email.clone(),
            first_name: Some(first_name),
            last_name: Some(last_name),
        };

        let order = match request.order_details {
            Some(products) if !products.is_empty() => Order { products },
            _ => default_order(cents),
        };

        let create = CreateIntentRequest {
            request_id: generate_id("req"),
            amount: cents,
            currency,
            merchant_order_id: Some(generate_id("order")),
            customer: Some(customer),
            order: Some(order),
        };

        gateway.create_intent(create).await
    }

    /// Create an intent entirely in-process, stored for later status polls
    pub fn create_mock(&self, request: CheckoutRequest) -> Result<PaymentIntent> {
        let (cents, currency) = validate(&request)?;
        let (first_name, last_name) = split_name(request.customer_name.as_deref());
        let now = chrono::Utc::now();

        let intent = PaymentIntent {
            id: generate_id(MOCK_INTENT_PREFIX),
            request_id: generate_id("req"),
            amount: cents,
            currency,
            merchant_order_id: generate_id("order"),
            status: IntentStatus::Created,
            customer: Some(Customer {
                email: request.customer_email,
                first_name: Some(first_name),
                last_name: Some(last_name),
            }),
            client_secret: ClientSecret::new(generate_id("mock_secret")),
            created_at: now,
            updated_at: now,
        };

        self.store.put(intent.clone())?;
        tracing::info!(
            intent_id = %intent.id,
            stored = self.store.len(),
            "created mock payment intent"
        );
        Ok(intent)
    }

    /// Current state of an intent, routed by ID prefix.
    ///
    /// Mock-prefixed IDs only ever consult the store; everything else goes
    /// to the gateway.
    pub async fn status(&self, id: &str) -> Result<PaymentIntent> {
        if id.trim().is_empty() {
            return Err(PaymentError::Validation(
                "payment intent ID is required".into(),
            ));
        }

        if is_mock_id(id) {
            return self
                .store
                .get(id)?
                .ok_or_else(|| PaymentError::NotFound(id.to_string()));
        }

        let gateway = self.gateway()?;
        match gateway.get_intent(id).await {
            Ok(intent) => Ok(intent),
            Err(e @ (PaymentError::Transport(_) | PaymentError::Protocol(_)))
                if self.demo_fallback =>
            {
                tracing::warn!(
                    intent_id = %id,
                    error = %e,
                    "gateway status check failed; demo fallback substituting succeeded"
                );
                Ok(Self::synthetic_succeeded(id))
            }
            Err(e) => Err(e),
        }
    }

    /// Confirm an intent with a payment method. No fallback.
    pub async fn confirm(&self, intent_id: &str, payment_method_id: &str) -> Result<PaymentIntent> {
        if intent_id.trim().is_empty() || payment_method_id.trim().is_empty() {
            return Err(PaymentError::Validation(
                "payment intent ID and payment method ID are required".into(),
            ));
        }

        self.gateway()?
            .confirm_intent(intent_id, payment_method_id)
            .await
    }

    fn synthetic_succeeded(id: &str) -> PaymentIntent {
        let now = chrono::Utc::now();
        PaymentIntent {
            id: id.to_string(),
            request_id: String::new(),
            amount: 0,
            currency: String::new(),
            merchant_order_id: String::new(),
            status: IntentStatus::Succeeded,
            customer: None,
            client_secret: ClientSecret::new(""),
            created_at: now,
            updated_at: now,
        }
    }
}
