//! # checkout-gateway
//!
//! Airwallex client for the site-checkout flow. Implements
//! [`checkout_core::PaymentGateway`]: authenticate against the login
//! endpoint (trying an ordered chain of strategies, since the provider's
//! sandbox has been observed to accept different credential placements),
//! then create, confirm, and poll payment intents.
//!
//! Every operation re-authenticates; tokens are not cached.

mod auth;
mod client;
mod config;

pub use auth::{default_strategies, run_auth_strategies, AuthContext, AuthStrategy};
pub use client::{acquire_token_with_retry, AirwallexClient};
pub use config::{GatewayConfig, RetryPolicy};
