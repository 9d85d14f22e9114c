//! Checkout route handlers.
//!
//! The browser drives the actual payment: the server creates the intent
//! with order metadata attached, hands back the client secret, and later
//! verifies the intent status on request. Field names follow the browser
//! client's JSON contract (camelCase).

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use czarcar_core::currency;
use czarcar_core::order::{OrderEmailData, OrderItem, encode_items};

use crate::error::{AppError, Result};
use crate::services::stripe::{CreatePaymentIntent, PaymentIntentStatus};
use crate::state::AppState;

/// Request body for creating a payment intent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentRequest {
    /// Order total in major currency units.
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    /// Free-form metadata forwarded into the intent's metadata bag.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub country_code: Option<String>,
}

/// Response for a created payment intent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
    /// The currency actually used, after allow-list normalization.
    pub currency: String,
}

/// Client-visible checkout configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfigResponse {
    pub publishable_key: String,
}

/// Request body for verifying a payment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub payment_intent_id: String,
    #[serde(default)]
    pub order_data: Option<OrderEmailData>,
}

/// Response for a verified payment.
#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub status: PaymentIntentStatus,
    pub amount: i64,
    pub currency: String,
    pub metadata: std::collections::HashMap<String, String>,
    pub created: i64,
}

/// Create a payment intent for the cart total.
///
/// POST /api/checkout/payment-intent
///
/// Rejects non-positive amounts before any provider call, normalizes the
/// currency against the supported allow-list, and attaches the serialized
/// item list to the intent's metadata bag.
#[instrument(skip(state, request))]
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CreateIntentRequest>,
) -> Result<Json<CreateIntentResponse>> {
    let params = prepare_intent(&request)?;
    let currency = params.currency.clone();

    let intent = state.stripe().create_payment_intent(&params).await?;
    tracing::info!(payment_intent_id = %intent.id, amount = intent.amount, %currency, "Payment intent created");

    let client_secret = intent
        .client_secret
        .ok_or_else(|| AppError::Internal("payment intent missing client secret".to_string()))?;

    Ok(Json(CreateIntentResponse {
        client_secret,
        payment_intent_id: intent.id,
        currency,
    }))
}

/// Client-visible checkout configuration.
///
/// GET /api/checkout/config
#[instrument(skip(state))]
pub async fn config(State(state): State<AppState>) -> Json<CheckoutConfigResponse> {
    Json(CheckoutConfigResponse {
        publishable_key: state.config().stripe.publishable_key.clone(),
    })
}

/// Verify a payment intent's status, dispatching order emails on success.
///
/// POST /api/checkout/verify
///
/// Email dispatch is best-effort: failures are logged, never surfaced, and
/// do not affect the response.
#[instrument(skip(state, request), fields(payment_intent_id = %request.payment_intent_id))]
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>> {
    if request.payment_intent_id.is_empty() {
        return Err(AppError::BadRequest("Payment intent ID required".to_string()));
    }

    let intent = state
        .stripe()
        .retrieve_payment_intent(&request.payment_intent_id)
        .await?;

    if intent.status == PaymentIntentStatus::Succeeded {
        if let Some(mut order) = request.order_data {
            // Key the notification off the verified intent, not client input.
            order.payment_intent_id = intent.id.clone();
            let outcome = state.notifier().notify(&order).await;
            tracing::info!(payment_intent_id = %intent.id, ?outcome, "Order notification attempted");
        }
    }

    Ok(Json(VerifyPaymentResponse {
        status: intent.status,
        amount: intent.amount,
        currency: intent.currency,
        metadata: intent.metadata,
        created: intent.created,
    }))
}

/// Validate and convert a create-intent request into provider parameters.
fn prepare_intent(request: &CreateIntentRequest) -> Result<CreatePaymentIntent> {
    let amount = request
        .amount
        .filter(|amount| amount.is_sign_positive() && !amount.is_zero())
        .ok_or_else(|| AppError::BadRequest("Invalid amount".to_string()))?;

    let currency = currency::normalize(request.currency.as_deref().unwrap_or_default());

    let amount_minor = currency::to_minor_units(amount, &currency)
        .ok_or_else(|| AppError::BadRequest("Invalid amount".to_string()))?;

    let mut metadata: BTreeMap<String, String> = request
        .metadata
        .iter()
        .map(|(key, value)| (key.clone(), metadata_value(value)))
        .collect();

    let customer_name = metadata
        .get("customer_name")
        .filter(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| "Customer".to_string());
    let receipt_email = metadata.get("email").filter(|e| !e.is_empty()).cloned();

    metadata.insert("order_items".to_string(), encode_items(&request.items));
    metadata.insert("order_total".to_string(), amount.to_string());
    metadata.insert("customer_name".to_string(), customer_name);
    if let Some(country) = request
        .country_code
        .as_deref()
        .filter(|code| !code.is_empty())
    {
        metadata.insert("country".to_string(), country.to_string());
    }

    Ok(CreatePaymentIntent {
        amount: amount_minor,
        currency,
        metadata,
        description: format!("CzarCar order ({} items)", request.items.len()),
        receipt_email,
    })
}

/// Render a metadata value as the flat string the provider expects.
fn metadata_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use czarcar_core::order::decode_items;

    use super::*;

    fn widget_request(amount: &str, currency: Option<&str>) -> CreateIntentRequest {
        CreateIntentRequest {
            amount: Some(amount.parse().unwrap()),
            currency: currency.map(String::from),
            metadata: serde_json::Map::new(),
            items: vec![OrderItem {
                id: Some("1".to_string()),
                name: "Widget".to_string(),
                options: None,
                quantity: 2,
                price: Decimal::from(10),
                total: Decimal::from(20),
            }],
            country_code: None,
        }
    }

    #[test]
    fn test_rejects_zero_and_negative_amounts() {
        for amount in ["0", "-5.00"] {
            let request = widget_request(amount, Some("usd"));
            let result = prepare_intent(&request);
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
    }

    #[test]
    fn test_rejects_missing_amount() {
        let mut request = widget_request("1", Some("usd"));
        request.amount = None;
        assert!(matches!(
            prepare_intent(&request),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_converts_to_minor_units() {
        let request = widget_request("49.99", Some("usd"));
        let params = prepare_intent(&request).unwrap();
        assert_eq!(params.amount, 4999);
        assert_eq!(params.currency, "usd");
    }

    #[test]
    fn test_unsupported_currency_substitutes_default() {
        let request = widget_request("10.00", Some("zzz"));
        let params = prepare_intent(&request).unwrap();
        assert_eq!(params.currency, "usd");
    }

    #[test]
    fn test_zero_decimal_currency_skips_scaling() {
        let request = widget_request("1500", Some("jpy"));
        let params = prepare_intent(&request).unwrap();
        assert_eq!(params.amount, 1500);
        assert_eq!(params.currency, "jpy");
    }

    #[test]
    fn test_metadata_carries_round_trippable_items() {
        let request = widget_request("49.99", Some("usd"));
        let params = prepare_intent(&request).unwrap();

        let encoded = params.metadata.get("order_items").unwrap();
        assert_eq!(decode_items(encoded), request.items);
        assert_eq!(params.metadata.get("order_total").unwrap(), "49.99");
        assert_eq!(params.metadata.get("customer_name").unwrap(), "Customer");
    }

    #[test]
    fn test_metadata_values_flattened_and_name_respected() {
        let mut request = widget_request("20.00", None);
        request.metadata.insert(
            "customer_name".to_string(),
            serde_json::Value::String("John Smith".to_string()),
        );
        request
            .metadata
            .insert("item_count".to_string(), serde_json::json!(3));
        request.country_code = Some("AU".to_string());

        let params = prepare_intent(&request).unwrap();
        assert_eq!(params.metadata.get("customer_name").unwrap(), "John Smith");
        assert_eq!(params.metadata.get("item_count").unwrap(), "3");
        assert_eq!(params.metadata.get("country").unwrap(), "AU");
        assert_eq!(params.description, "CzarCar order (1 items)");
    }
}
