//! # checkout-core
//!
//! Shared types for the site-checkout payment flow: the payment intent
//! model and its status lifecycle, the error taxonomy every crate in the
//! workspace speaks, and the [`PaymentGateway`] trait implemented by
//! provider clients (and by mocks in tests).

mod error;
mod gateway;
mod intent;

pub use error::{PaymentError, Result};
pub use gateway::{CreateIntentRequest, Order, PaymentGateway, Product};
pub use intent::{
    generate_id, is_mock_id, preview, ClientSecret, Customer, IntentStatus, PaymentIntent,
    MOCK_INTENT_PREFIX,
};
