//! Stripe API client for payment intents and webhook verification.
//!
//! Talks to the Stripe REST API directly with form-encoded requests. The
//! application treats a payment intent as an opaque remote resource: it
//! creates one with order metadata attached, fetches it back by id, and
//! reacts to the webhook events Stripe sends about it.

use std::collections::{BTreeMap, HashMap};

use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::config::StripeConfig;

/// Stripe API base URL.
const BASE_URL: &str = "https://api.stripe.com/v1";

/// Maximum accepted webhook timestamp skew in seconds (replay protection).
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when interacting with the Stripe API.
#[derive(Debug, Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Webhook signature verification failed.
    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    /// Failed to parse a response or payload.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Lifecycle status of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Succeeded,
    Canceled,
    /// Any status this client does not model.
    #[serde(other)]
    Unknown,
}

/// Shipping details attached to a payment intent at confirmation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<ShippingDetailsAddress>,
}

/// Address portion of the shipping details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingDetailsAddress {
    #[serde(default)]
    pub line1: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// A payment intent as returned by the Stripe API.
///
/// Only the fields this application reads; everything else is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Amount in the currency's smallest unit.
    pub amount: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
    /// The metadata bag carrying serialized order details.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    #[serde(default)]
    pub receipt_email: Option<String>,
    #[serde(default)]
    pub shipping: Option<ShippingDetails>,
    /// Unix timestamp of creation.
    #[serde(default)]
    pub created: i64,
}

/// Parameters for creating a payment intent.
#[derive(Debug, Clone)]
pub struct CreatePaymentIntent {
    /// Amount in the currency's smallest unit.
    pub amount: i64,
    /// Normalized lowercase currency code.
    pub currency: String,
    /// Metadata bag (ordered so request encoding is deterministic).
    pub metadata: BTreeMap<String, String>,
    pub description: String,
    pub receipt_email: Option<String>,
}

/// A webhook event envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

/// The `data` member of a webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: serde_json::Value,
}

impl WebhookEvent {
    /// Deserialize the event payload as a payment intent.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::Parse` if the payload is not a payment intent.
    pub fn payment_intent(&self) -> Result<PaymentIntent, StripeError> {
        serde_json::from_value(self.data.object.clone())
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}

/// Stripe API client.
#[derive(Clone)]
pub struct StripeClient {
    client: reqwest::Client,
    webhook_secret: SecretString,
}

impl StripeClient {
    /// Create a new Stripe API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StripeConfig) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth_header = HeaderValue::from_str(&auth_value)
            .map_err(|e| StripeError::Parse(format!("Invalid API key format: {e}")))?;
        auth_header.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            webhook_secret: config.webhook_secret.clone(),
        })
    }

    /// Create a payment intent with order metadata attached.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response cannot be
    /// parsed.
    pub async fn create_payment_intent(
        &self,
        params: &CreatePaymentIntent,
    ) -> Result<PaymentIntent, StripeError> {
        let url = format!("{BASE_URL}/payment_intents");

        let mut form: Vec<(String, String)> = vec![
            ("amount".to_string(), params.amount.to_string()),
            ("currency".to_string(), params.currency.clone()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
            ("description".to_string(), params.description.clone()),
        ];
        for (key, value) in &params.metadata {
            form.push((format!("metadata[{key}]"), value.clone()));
        }
        if let Some(email) = &params.receipt_email {
            form.push(("receipt_email".to_string(), email.clone()));
        }

        let response = self.client.post(&url).form(&form).send().await?;
        Self::parse_response(response).await
    }

    /// Fetch a payment intent by id.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the response cannot be
    /// parsed.
    pub async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, StripeError> {
        let url = format!("{BASE_URL}/payment_intents/{id}");
        let response = self.client.get(&url).send().await?;
        Self::parse_response(response).await
    }

    /// Verify a webhook signature header against the raw request body.
    ///
    /// The header carries `t=<unix-seconds>,v1=<hex hmac>` pairs; the
    /// signature is HMAC-SHA256 of `"{t}.{body}"` under the webhook
    /// signing secret. Timestamps outside the tolerance window are
    /// rejected to block replays.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::InvalidSignature` on any mismatch or a
    /// malformed header.
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<(), StripeError> {
        let mut timestamp: Option<&str> = None;
        let mut candidates: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = Some(value),
                Some(("v1", value)) => candidates.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| StripeError::InvalidSignature("Missing timestamp".to_string()))?;
        if candidates.is_empty() {
            return Err(StripeError::InvalidSignature(
                "Missing v1 signature".to_string(),
            ));
        }

        let ts: i64 = timestamp
            .parse()
            .map_err(|_| StripeError::InvalidSignature("Invalid timestamp".to_string()))?;
        let now = chrono::Utc::now().timestamp();
        if (now - ts).abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(StripeError::InvalidSignature(
                "Request timestamp too old".to_string(),
            ));
        }

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.expose_secret().as_bytes())
            .map_err(|e| StripeError::InvalidSignature(e.to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = hex::encode(mac.finalize().into_bytes());

        if candidates
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate))
        {
            Ok(())
        } else {
            Err(StripeError::InvalidSignature(
                "Signature mismatch".to_string(),
            ))
        }
    }

    /// Verify the signature, then parse the event envelope.
    ///
    /// # Errors
    ///
    /// Returns `StripeError::InvalidSignature` on verification failure and
    /// `StripeError::Parse` if the verified payload is not a valid event.
    pub fn construct_webhook_event(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, StripeError> {
        self.verify_webhook_signature(payload, signature_header)?;
        serde_json::from_slice(payload).map_err(|e| StripeError::Parse(e.to_string()))
    }

    /// Parse an API response, mapping non-2xx statuses to `StripeError::Api`.
    async fn parse_response(response: reqwest::Response) -> Result<PaymentIntent, StripeError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_api_error_message(&body);
            return Err(StripeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StripeError::Parse(e.to_string()))
    }
}

/// Pull the human-readable message out of a Stripe error body, falling back
/// to the raw body.
fn extract_api_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorDetails,
    }
    #[derive(Deserialize)]
    struct ErrorDetails {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.to_string())
}

/// Compare strings in constant time.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client() -> StripeClient {
        StripeClient::new(&StripeConfig {
            secret_key: SecretString::from("sk_test_xxx"),
            publishable_key: "pk_test_xxx".to_string(),
            webhook_secret: SecretString::from("whsec_test123key456"),
        })
        .expect("client builds")
    }

    fn sign(payload: &[u8], key: &str, timestamp: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(key.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.").as_bytes());
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn current_timestamp() -> String {
        chrono::Utc::now().timestamp().to_string()
    }

    #[test]
    fn test_valid_signature_accepted() {
        let client = test_client();
        let payload = b"{\"type\":\"payment_intent.succeeded\"}";
        let timestamp = current_timestamp();
        let signature = sign(payload, "whsec_test123key456", &timestamp);
        let header = format!("t={timestamp},v1={signature}");

        assert!(client.verify_webhook_signature(payload, &header).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let client = test_client();
        let payload = b"{\"type\":\"payment_intent.succeeded\"}";
        let timestamp = current_timestamp();
        let signature = sign(payload, "wrong_key", &timestamp);
        let header = format!("t={timestamp},v1={signature}");

        let result = client.verify_webhook_signature(payload, &header);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_modified_payload_rejected() {
        let client = test_client();
        let original = b"{\"type\":\"payment_intent.succeeded\"}";
        let modified = b"{\"type\":\"payment_intent.succeeded\",\"hacked\":true}";
        let timestamp = current_timestamp();
        let signature = sign(original, "whsec_test123key456", &timestamp);
        let header = format!("t={timestamp},v1={signature}");

        let result = client.verify_webhook_signature(modified, &header);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_old_timestamp_rejected() {
        let client = test_client();
        let payload = b"{}";
        // 10 minutes ago - beyond the 5-minute tolerance
        let timestamp = (chrono::Utc::now().timestamp() - 600).to_string();
        let signature = sign(payload, "whsec_test123key456", &timestamp);
        let header = format!("t={timestamp},v1={signature}");

        let result = client.verify_webhook_signature(payload, &header);
        assert!(matches!(result, Err(StripeError::InvalidSignature(_))));
    }

    #[test]
    fn test_malformed_headers_rejected() {
        let client = test_client();
        let payload = b"{}";

        for header in ["", "garbage", "t=1234567890", "v1=deadbeef"] {
            let result = client.verify_webhook_signature(payload, header);
            assert!(
                matches!(result, Err(StripeError::InvalidSignature(_))),
                "header {header:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_construct_webhook_event_parses_envelope() {
        let client = test_client();
        let payload = serde_json::json!({
            "id": "evt_123",
            "type": "payment_intent.succeeded",
            "data": {
                "object": {
                    "id": "pi_123",
                    "amount": 4999,
                    "currency": "usd",
                    "status": "succeeded"
                }
            }
        });
        let bytes = serde_json::to_vec(&payload).unwrap();
        let timestamp = current_timestamp();
        let signature = sign(&bytes, "whsec_test123key456", &timestamp);
        let header = format!("t={timestamp},v1={signature}");

        let event = client.construct_webhook_event(&bytes, &header).unwrap();
        assert_eq!(event.event_type, "payment_intent.succeeded");

        let intent = event.payment_intent().unwrap();
        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.amount, 4999);
        assert_eq!(intent.status, PaymentIntentStatus::Succeeded);
    }

    #[test]
    fn test_unknown_status_maps_to_unknown() {
        let intent: PaymentIntent = serde_json::from_value(serde_json::json!({
            "id": "pi_123",
            "amount": 100,
            "currency": "usd",
            "status": "some_future_status"
        }))
        .unwrap();
        assert_eq!(intent.status, PaymentIntentStatus::Unknown);
    }

    #[test]
    fn test_extract_api_error_message() {
        let body = r#"{"error":{"message":"No such payment_intent"}}"#;
        assert_eq!(extract_api_error_message(body), "No such payment_intent");

        assert_eq!(extract_api_error_message("plain text"), "plain text");
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc", "abc"));
        assert!(!constant_time_compare("abc", "abd"));
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
