//! Checkout and order API validation tests.
//!
//! These requests must be rejected (or answered) before the handler ever
//! reaches the payment provider or the mail transport.

use axum::http::{Request, StatusCode};
use axum::body::Body;
use serde_json::json;
use tower::ServiceExt;

use czarcar_integration_tests::{json_post, response_json, test_app};

#[tokio::test]
async fn create_intent_rejects_zero_amount() {
    let app = test_app();

    let response = app
        .oneshot(json_post(
            "/api/checkout/payment-intent",
            &json!({"amount": 0, "currency": "usd"}),
        ))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Invalid amount");
}

#[tokio::test]
async fn create_intent_rejects_negative_amount() {
    let app = test_app();

    let response = app
        .oneshot(json_post(
            "/api/checkout/payment-intent",
            &json!({"amount": -10.5, "currency": "usd"}),
        ))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_intent_rejects_missing_amount() {
    let app = test_app();

    let response = app
        .oneshot(json_post(
            "/api/checkout/payment-intent",
            &json!({"currency": "usd"}),
        ))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_config_exposes_publishable_key() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/checkout/config")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["publishableKey"], "pk_test_xxx");
}

#[tokio::test]
async fn verify_payment_requires_intent_id() {
    let app = test_app();

    let response = app
        .oneshot(json_post("/api/checkout/verify", &json!({})))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Payment intent ID required");
}

#[tokio::test]
async fn send_order_email_rejects_missing_fields() {
    let app = test_app();

    // No customer name or order number.
    let response = app
        .oneshot(json_post(
            "/api/orders/email",
            &json!({"customerEmail": "jane@example.com"}),
        ))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Missing required order data");
}

#[tokio::test]
async fn send_order_email_rejects_malformed_address() {
    let app = test_app();

    let response = app
        .oneshot(json_post(
            "/api/orders/email",
            &json!({
                "customerEmail": "not-an-email",
                "customerName": "Jane Doe",
                "orderNumber": "CZ-123456"
            }),
        ))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn products_endpoints_serve_catalog() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/products")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body.as_array().is_some_and(|products| !products.is_empty()));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/products/1")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/products/no-such-id")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
