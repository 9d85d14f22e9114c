//! Order email route handler.
//!
//! The browser fires this right after confirming payment, independently of
//! the provider webhook. Both triggers funnel into the same notifier, so
//! whichever arrives second finds the intent already claimed and sends
//! nothing.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use czarcar_core::Email;
use czarcar_core::order::OrderEmailData;

use crate::error::{AppError, Result};
use crate::services::notifier::NotifyOutcome;
use crate::state::AppState;

/// Response for an order email request.
#[derive(Debug, Serialize)]
pub struct OrderEmailResponse {
    pub success: bool,
    pub message: String,
}

/// Send the order confirmation and owner alert for a completed order.
///
/// POST /api/orders/email
#[instrument(skip(state, order), fields(order_number = %order.order_number))]
pub async fn send_order_email(
    State(state): State<AppState>,
    Json(order): Json<OrderEmailData>,
) -> Result<Json<OrderEmailResponse>> {
    if order.customer_email.is_empty()
        || order.customer_name.is_empty()
        || order.order_number.is_empty()
    {
        return Err(AppError::BadRequest(
            "Missing required order data".to_string(),
        ));
    }

    if Email::parse(&order.customer_email).is_err() {
        return Err(AppError::BadRequest(
            "Invalid customer email address".to_string(),
        ));
    }

    let outcome = state.notifier().notify(&order).await;

    // Success gates on the customer confirmation; a failed owner alert is
    // reported but does not fail the order.
    match outcome {
        NotifyOutcome::AlreadyNotified => Ok(Json(OrderEmailResponse {
            success: true,
            message: "Order notifications already sent".to_string(),
        })),
        NotifyOutcome::Sent {
            customer_sent: true,
            owner_sent: true,
        } => Ok(Json(OrderEmailResponse {
            success: true,
            message: "Order confirmation and owner alert sent".to_string(),
        })),
        NotifyOutcome::Sent {
            customer_sent: true,
            owner_sent: false,
        } => Ok(Json(OrderEmailResponse {
            success: true,
            message: "Order confirmation sent; owner alert failed".to_string(),
        })),
        NotifyOutcome::Sent {
            customer_sent: false,
            ..
        } => Err(AppError::NotificationFailed),
    }
}
