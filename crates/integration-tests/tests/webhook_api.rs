//! Webhook receiver tests.
//!
//! Signature verification gates everything: an unverified payload is
//! rejected with a client error and zero processing. Verified events the
//! handler does not act on are acknowledged with a 200.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use czarcar_integration_tests::{
    TEST_WEBHOOK_SECRET, response_json, sign_webhook, test_app,
};

fn webhook_request(payload: &serde_json::Value, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/webhooks/stripe")
        .header("content-type", "application/json");
    if let Some(signature) = signature {
        builder = builder.header("stripe-signature", signature);
    }
    builder
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn missing_signature_header_is_rejected() {
    let app = test_app();
    let payload = json!({"type": "payment_intent.succeeded", "data": {"object": {}}});

    let response = app
        .oneshot(webhook_request(&payload, None))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_signature_is_rejected_with_zero_processing() {
    let app = test_app();
    let payload = json!({"type": "payment_intent.succeeded", "data": {"object": {}}});
    let signature = sign_webhook(
        payload.to_string().as_bytes(),
        "wrong_secret_key",
        chrono::Utc::now().timestamp(),
    );

    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Webhook signature verification failed");
}

#[tokio::test]
async fn stale_timestamp_is_rejected() {
    let app = test_app();
    let payload = json!({"type": "payment_intent.succeeded", "data": {"object": {}}});
    // 10 minutes old - outside the tolerance window.
    let signature = sign_webhook(
        payload.to_string().as_bytes(),
        TEST_WEBHOOK_SECRET,
        chrono::Utc::now().timestamp() - 600,
    );

    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unhandled_event_type_is_acknowledged() {
    let app = test_app();
    let payload = json!({
        "id": "evt_1",
        "type": "charge.refunded",
        "data": {"object": {"id": "ch_123"}}
    });
    let signature = sign_webhook(
        payload.to_string().as_bytes(),
        TEST_WEBHOOK_SECRET,
        chrono::Utc::now().timestamp(),
    );

    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["received"], true);
}

#[tokio::test]
async fn payment_failed_event_is_acknowledged() {
    let app = test_app();
    let payload = json!({
        "id": "evt_2",
        "type": "payment_intent.payment_failed",
        "data": {
            "object": {
                "id": "pi_failed",
                "amount": 4999,
                "currency": "usd",
                "status": "requires_payment_method"
            }
        }
    });
    let signature = sign_webhook(
        payload.to_string().as_bytes(),
        TEST_WEBHOOK_SECRET,
        chrono::Utc::now().timestamp(),
    );

    let response = app
        .oneshot(webhook_request(&payload, Some(&signature)))
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["received"], true);
}
