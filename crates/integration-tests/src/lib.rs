//! Shared helpers for storefront integration tests.
//!
//! Builds the real router over a lazily-connected pool so tests can drive
//! handlers with `tower::ServiceExt::oneshot`. Paths that would hit the
//! database or an external provider are not exercised here; the covered
//! paths all terminate before any I/O.

#![cfg_attr(not(test), forbid(unsafe_code))]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use sha2::Sha256;

use czarcar_storefront::config::{EmailConfig, StorefrontConfig, StripeConfig};
use czarcar_storefront::db;
use czarcar_storefront::routes;
use czarcar_storefront::state::AppState;

/// Webhook signing secret used by the test configuration.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test123key456";

/// Build a storefront configuration for tests.
///
/// # Panics
///
/// Panics if the fixed values fail to parse.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/czarcar_test"),
        host: "127.0.0.1".parse().expect("valid host"),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_secret: SecretString::from("x".repeat(32)),
        stripe: StripeConfig {
            secret_key: SecretString::from("sk_test_xxx"),
            publishable_key: "pk_test_xxx".to_string(),
            webhook_secret: SecretString::from(TEST_WEBHOOK_SECRET),
        },
        email: EmailConfig {
            smtp_host: "smtp.test.local".to_string(),
            smtp_port: 587,
            smtp_username: "mailer".to_string(),
            smtp_password: SecretString::from("smtp-pass"),
            from_address: "orders@czarcar.shop".to_string(),
            owner_address: "owner@czarcar.shop".to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Build the storefront router over a lazy pool.
///
/// # Panics
///
/// Panics if the state cannot be constructed.
#[must_use]
pub fn test_app() -> Router {
    let config = test_config();
    let pool = db::create_lazy_pool(&config.database_url).expect("lazy pool");
    let state = AppState::new(config, pool).expect("app state");
    routes::routes().with_state(state)
}

/// Build a JSON POST request.
///
/// # Panics
///
/// Panics if the request fails to build.
#[must_use]
pub fn json_post(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

/// Compute a webhook signature header for a payload.
///
/// # Panics
///
/// Panics if the HMAC key is rejected (it never is).
#[must_use]
pub fn sign_webhook(payload: &[u8], secret: &str, timestamp: i64) -> String {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key size");
    mac.update(format!("{timestamp}.").as_bytes());
    mac.update(payload);
    format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
}

/// Read a response body as JSON.
///
/// # Panics
///
/// Panics if the body is not valid JSON.
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
