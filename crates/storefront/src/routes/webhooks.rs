//! Stripe webhook receiver.
//!
//! The provider calls back asynchronously as payment intents move through
//! their lifecycle. Nothing in the payload is trusted until the signature
//! header verifies against the shared signing secret; an unverified request
//! is rejected outright. After that the response is always a 200
//! acknowledgement - processing failures are logged, not re-raised, so the
//! provider does not retry into the same failure forever.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
};
use serde::Serialize;
use tracing::instrument;

use czarcar_core::currency;
use czarcar_core::order::{OrderEmailData, ShippingAddress, decode_items, order_number};

use crate::error::{AppError, Result};
use crate::services::stripe::PaymentIntent;
use crate::state::AppState;

/// Recipient substituted when a succeeded intent carries no receipt email.
const PLACEHOLDER_RECIPIENT: &str = "customer@czarcar.shop";

/// Acknowledgement body returned for every accepted webhook.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Handle a Stripe webhook event.
///
/// POST /api/webhooks/stripe
#[instrument(skip(state, headers, body))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookAck>> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Stripe-Signature header".to_string()))?;

    let event = state
        .stripe()
        .construct_webhook_event(body.as_bytes(), signature)
        .map_err(|e| {
            tracing::warn!(error = %e, "Webhook rejected");
            AppError::BadRequest("Webhook signature verification failed".to_string())
        })?;

    tracing::debug!(event_id = %event.id, event_type = %event.event_type, "Webhook event received");

    match event.event_type.as_str() {
        "payment_intent.succeeded" => match event.payment_intent() {
            Ok(intent) => {
                tracing::info!(payment_intent_id = %intent.id, "Payment succeeded");
                let order = order_from_intent(&intent);
                let outcome = state.notifier().notify(&order).await;
                tracing::info!(
                    payment_intent_id = %intent.id,
                    order_number = %order.order_number,
                    ?outcome,
                    "Order notification attempted"
                );
            }
            Err(e) => {
                tracing::error!(event_id = %event.id, error = %e, "Malformed payment intent payload");
            }
        },
        "payment_intent.payment_failed" => match event.payment_intent() {
            Ok(intent) => {
                tracing::warn!(payment_intent_id = %intent.id, "Payment failed");
            }
            Err(e) => {
                tracing::warn!(event_id = %event.id, error = %e, "Payment failed (unparseable payload)");
            }
        },
        other => {
            tracing::debug!(event_type = %other, "Unhandled event type");
        }
    }

    Ok(Json(WebhookAck { received: true }))
}

/// Rebuild order email data from a succeeded payment intent.
///
/// The intent's metadata bag smuggled the order details through the
/// provider; every field degrades to a placeholder rather than failing.
fn order_from_intent(intent: &PaymentIntent) -> OrderEmailData {
    let order_items = decode_items(
        intent
            .metadata
            .get("order_items")
            .map_or("", String::as_str),
    );

    let shipping_name = intent
        .shipping
        .as_ref()
        .and_then(|shipping| shipping.name.clone());
    let customer_name = intent
        .metadata
        .get("customer_name")
        .cloned()
        .filter(|name| !name.is_empty())
        .or(shipping_name)
        .unwrap_or_else(|| "Customer".to_string());

    let customer_email = intent
        .receipt_email
        .clone()
        .filter(|email| !email.is_empty())
        .unwrap_or_else(|| PLACEHOLDER_RECIPIENT.to_string());

    let address = intent
        .shipping
        .as_ref()
        .and_then(|shipping| shipping.address.as_ref());
    let shipping_address = ShippingAddress {
        name: intent
            .shipping
            .as_ref()
            .and_then(|shipping| shipping.name.clone())
            .unwrap_or_else(|| customer_name.clone()),
        address: address
            .and_then(|a| a.line1.clone())
            .unwrap_or_else(|| "Address not provided".to_string()),
        city: address
            .and_then(|a| a.city.clone())
            .unwrap_or_else(|| "City not provided".to_string()),
        state: address
            .and_then(|a| a.state.clone())
            .unwrap_or_else(|| "State not provided".to_string()),
        zip_code: address
            .and_then(|a| a.postal_code.clone())
            .unwrap_or_else(|| "ZIP not provided".to_string()),
    };

    OrderEmailData {
        customer_email,
        customer_name,
        order_number: order_number(),
        order_total: currency::from_minor_units(intent.amount, &intent.currency),
        order_items,
        shipping_address,
        payment_intent_id: intent.id.clone(),
    }
}
