//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (DB ping)
//!
//! # Products
//! GET  /products                      - Product listing (?category=, ?q=)
//! GET  /products/featured             - Featured products
//! GET  /products/{id}                 - Product detail
//!
//! # Cart (session-backed)
//! GET  /cart                          - Cart contents
//! POST /cart/add                      - Add a product (merges same options)
//! POST /cart/update                   - Set line quantity (0 removes)
//! POST /cart/remove                   - Remove a line
//! POST /cart/clear                    - Empty the cart
//! GET  /cart/count                    - Item count badge
//!
//! # Checkout
//! POST /api/checkout/payment-intent   - Create a payment intent
//! GET  /api/checkout/config           - Publishable key for the browser
//! POST /api/checkout/verify           - Verify intent status (+ emails)
//!
//! # Orders
//! POST /api/orders/email              - Send order confirmation + owner alert
//!
//! # Webhooks
//! POST /api/webhooks/stripe           - Stripe event receiver
//! ```

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;
pub mod webhooks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/featured", get(products::featured))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout API router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/payment-intent", post(checkout::create_payment_intent))
        .route("/config", get(checkout::config))
        .route("/verify", post(checkout::verify_payment))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
        .route("/api/orders/email", post(orders::send_order_email))
        .route("/api/webhooks/stripe", post(webhooks::stripe_webhook))
}
