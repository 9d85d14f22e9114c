//! Order notification data.
//!
//! `OrderEmailData` exists only in flight: it is built from the checkout
//! form or rebuilt from a payment intent's metadata bag, handed to the
//! email sender, and never persisted.
//!
//! Field names follow the JSON wire contract used by the browser client
//! (`customerEmail`, `zipCode`, ...), hence the camelCase renames.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single line on an order, as rendered in emails and carried through the
/// payment intent metadata bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Display label of the selected options ("Blue / 3M / USB Plug").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
    pub total: Decimal,
}

/// Where the order ships.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

/// Everything the order emails need, gathered per order.
///
/// All fields default so a sparse client payload deserializes instead of
/// bouncing; handlers validate the required fields explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEmailData {
    #[serde(default)]
    pub customer_email: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub order_total: Decimal,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_intent_id: String,
}

/// Generate an order number from the current timestamp.
///
/// "CZ-" plus the last six digits of the unix-millis clock. Human-friendly
/// and unique enough for a small shop; not globally unique.
#[must_use]
pub fn order_number() -> String {
    let millis = Utc::now().timestamp_millis();
    format!("CZ-{:06}", millis.rem_euclid(1_000_000))
}

/// Serialize order items for the payment intent metadata bag.
#[must_use]
pub fn encode_items(items: &[OrderItem]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

/// Parse order items out of the metadata bag.
///
/// Tolerant by contract: a missing or malformed value yields an empty list
/// rather than failing the webhook.
#[must_use]
pub fn decode_items(raw: &str) -> Vec<OrderItem> {
    serde_json::from_str(raw).unwrap_or_default()
}
