//! HTTP-level tests for the Airwallex client against a local mock server.

use std::time::{Duration, Instant};

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use checkout_core::{CreateIntentRequest, Customer, IntentStatus, PaymentError, PaymentGateway};
use checkout_gateway::{AirwallexClient, GatewayConfig, RetryPolicy};

const LOGIN_PATH: &str = "/api/v1/authentication/login";
const CREATE_PATH: &str = "/api/v1/pa/payment_intents/create";

fn test_config(server: &MockServer, attempts: u32) -> GatewayConfig {
    GatewayConfig {
        base_url: server.uri(),
        client_id: Some("test_client".into()),
        api_key: Some("test_key".into()),
        timeout: Duration::from_secs(5),
        auth_retry: RetryPolicy {
            attempts,
            delay: Duration::from_millis(5),
        },
    }
}

fn create_request() -> CreateIntentRequest {
    CreateIntentRequest {
        request_id: "req_1735689600000_a1b2c3d".into(),
        amount: 2500,
        currency: "USD".into(),
        merchant_order_id: Some("order_1735689600000_e4f5g6h".into()),
        customer: Some(Customer {
            email: Some("jordan@example.com".into()),
            first_name: Some("Jordan".into()),
            last_name: Some("Lee".into()),
        }),
        order: None,
    }
}

fn intent_body(client_secret: Option<&str>) -> serde_json::Value {
    let mut body = json!({
        "id": "int_hkdm78sh9wz",
        "request_id": "req_1735689600000_a1b2c3d",
        "amount": 2500,
        "currency": "USD",
        "merchant_order_id": "order_1735689600000_e4f5g6h",
        "status": "REQUIRES_PAYMENT_METHOD",
        "created_at": "2025-01-01T00:00:00Z",
    });
    if let Some(secret) = client_secret {
        body["client_secret"] = json!(secret);
    }
    body
}

#[tokio::test]
async fn auth_falls_through_to_credentials_in_body() {
    let server = MockServer::start().await;

    // Header-based logins are refused; only credentials in the body work
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(body_json(json!({
            "client_id": "test_client",
            "api_key": "test_key",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok_from_body_auth",
            "expires_at": "2025-01-01T01:00:00Z",
        })))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("credentials not in headers"))
        .mount(&server)
        .await;

    let client = AirwallexClient::new(test_config(&server, 1)).unwrap();
    let token = client.authenticate().await.unwrap();
    assert_eq!(token, "tok_from_body_auth");
}

#[tokio::test]
async fn create_intent_happy_path() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "tok_123",
            "expires_at": "2025-01-01T01:00:00Z",
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .and(header("authorization", "Bearer tok_123"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(intent_body(Some("int_secret_xyz"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = AirwallexClient::new(test_config(&server, 3)).unwrap();
    let intent = client.create_intent(create_request()).await.unwrap();

    assert_eq!(intent.id, "int_hkdm78sh9wz");
    assert_eq!(intent.amount, 2500);
    assert_eq!(intent.currency, "USD");
    // Provider intermediate statuses normalize to created
    assert_eq!(intent.status, IntentStatus::Created);
    assert_eq!(intent.client_secret.expose(), "int_secret_xyz");
}

#[tokio::test]
async fn create_intent_missing_client_secret_is_protocol_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok_123" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(intent_body(None)))
        .mount(&server)
        .await;

    let client = AirwallexClient::new(test_config(&server, 1)).unwrap();
    let err = client.create_intent(create_request()).await.unwrap_err();
    assert!(matches!(err, PaymentError::Protocol(_)), "got {:?}", err);
}

#[tokio::test]
async fn create_intent_maps_bad_request_with_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok_123" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("currency AAA is not supported"),
        )
        .mount(&server)
        .await;

    let client = AirwallexClient::new(test_config(&server, 1)).unwrap();
    match client.create_intent(create_request()).await.unwrap_err() {
        PaymentError::Validation(msg) => assert!(msg.contains("currency AAA is not supported")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn create_intent_maps_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok_stale" })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = AirwallexClient::new(test_config(&server, 1)).unwrap();
    assert!(matches!(
        client.create_intent(create_request()).await.unwrap_err(),
        PaymentError::Authentication(_)
    ));
}

#[tokio::test]
async fn create_intent_retries_auth_then_gives_up() {
    let server = MockServer::start().await;

    // Every login attempt fails: 5 strategies per authenticate, 3 attempts
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("login unavailable"))
        .expect(15)
        .mount(&server)
        .await;

    let client = AirwallexClient::new(test_config(&server, 3)).unwrap();
    let started = Instant::now();
    let err = client.create_intent(create_request()).await.unwrap_err();

    assert!(matches!(err, PaymentError::Authentication(_)), "got {:?}", err);
    // Two inter-attempt delays elapsed
    assert!(started.elapsed() >= Duration::from_millis(10));
}

#[tokio::test]
async fn confirm_authenticates_once_without_retry() {
    let server = MockServer::start().await;

    // One strategy-chain pass (5 logins), no second attempt
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(5)
        .mount(&server)
        .await;

    let client = AirwallexClient::new(test_config(&server, 3)).unwrap();
    let err = client
        .confirm_intent("int_hkdm78sh9wz", "pm_card_visa")
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Authentication(_)));
}

#[tokio::test]
async fn get_intent_maps_404_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok_123" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/pa/payment_intents/int_gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = AirwallexClient::new(test_config(&server, 1)).unwrap();
    assert!(matches!(
        client.get_intent("int_gone").await.unwrap_err(),
        PaymentError::NotFound(_)
    ));
}

#[tokio::test]
async fn get_intent_reports_provider_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok_123" })))
        .mount(&server)
        .await;

    let mut body = intent_body(Some("int_secret_xyz"));
    body["status"] = json!("SUCCEEDED");
    Mock::given(method("GET"))
        .and(path("/api/v1/pa/payment_intents/int_hkdm78sh9wz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let client = AirwallexClient::new(test_config(&server, 1)).unwrap();
    let intent = client.get_intent("int_hkdm78sh9wz").await.unwrap();
    assert_eq!(intent.status, IntentStatus::Succeeded);
}
