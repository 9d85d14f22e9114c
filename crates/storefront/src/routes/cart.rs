//! Cart route handlers.
//!
//! The cart lives in the shopper's session, loaded and saved around each
//! mutation through the `CartStorage` seam. Responses are JSON views with
//! preformatted prices for direct display.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use czarcar_core::cart::{Cart, CartItem, SelectedOptions};

use crate::cart_store::{CartStorage, SessionCartStore};
use crate::catalog;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub price: String,
    pub line_total: String,
}

/// Cart display data.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

/// Item count badge data.
#[derive(Debug, Serialize)]
pub struct CartCountView {
    pub count: u32,
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: String,
    #[serde(default)]
    pub options: Option<SelectedOptions>,
    #[serde(default)]
    pub option_image: Option<String>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartRequest {
    pub item_id: String,
    pub quantity: u32,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveFromCartRequest {
    pub item_id: String,
}

/// Format a decimal amount as a price string.
fn format_price(amount: Decimal) -> String {
    format!("${amount:.2}")
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            product_id: item.product.id.clone(),
            name: item.product.name.clone(),
            quantity: item.quantity,
            option_label: item.option_label.clone(),
            image: item
                .option_image
                .clone()
                .or_else(|| Some(item.product.image.clone()).filter(|i| !i.is_empty())),
            price: format_price(item.product.price),
            line_total: format_price(item.line_total()),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            subtotal: format_price(cart.subtotal()),
            item_count: cart.item_count(),
        }
    }
}

/// Persist the cart, logging (not failing) on session errors.
async fn save_cart(store: &SessionCartStore, cart: &Cart) {
    if let Err(e) = store.save(cart).await {
        tracing::error!(error = %e, "Failed to save cart to session");
    }
}

/// Show the cart.
///
/// GET /cart
#[instrument(skip(_state, session))]
pub async fn show(State(_state): State<AppState>, session: Session) -> Json<CartView> {
    let cart = SessionCartStore::new(session).load().await;
    Json(CartView::from(&cart))
}

/// Add one unit of a product to the cart.
///
/// POST /cart/add
///
/// A line with the same product and option selection is merged by bumping
/// its quantity.
#[instrument(skip(_state, session, request), fields(product_id = %request.product_id))]
pub async fn add(
    State(_state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = catalog::by_id(&request.product_id)
        .ok_or_else(|| AppError::NotFound(format!("No product with id {}", request.product_id)))?;

    if !product.in_stock {
        return Err(AppError::BadRequest("Product is out of stock".to_string()));
    }

    let store = SessionCartStore::new(session);
    let mut cart = store.load().await;
    cart.add(product.clone(), request.options, request.option_image);
    save_cart(&store, &cart).await;

    Ok(Json(CartView::from(&cart)))
}

/// Set a cart line's quantity. Zero removes the line.
///
/// POST /cart/update
#[instrument(skip(_state, session, request), fields(item_id = %request.item_id))]
pub async fn update(
    State(_state): State<AppState>,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Json<CartView> {
    let store = SessionCartStore::new(session);
    let mut cart = store.load().await;
    cart.set_quantity(&request.item_id, request.quantity);
    save_cart(&store, &cart).await;

    Json(CartView::from(&cart))
}

/// Remove a cart line.
///
/// POST /cart/remove
#[instrument(skip(_state, session, request), fields(item_id = %request.item_id))]
pub async fn remove(
    State(_state): State<AppState>,
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Json<CartView> {
    let store = SessionCartStore::new(session);
    let mut cart = store.load().await;
    cart.remove(&request.item_id);
    save_cart(&store, &cart).await;

    Json(CartView::from(&cart))
}

/// Empty the cart (called after a successful checkout).
///
/// POST /cart/clear
#[instrument(skip(_state, session))]
pub async fn clear(State(_state): State<AppState>, session: Session) -> Json<CartView> {
    let store = SessionCartStore::new(session);
    let mut cart = store.load().await;
    cart.clear();
    save_cart(&store, &cart).await;

    Json(CartView::from(&cart))
}

/// Item count badge.
///
/// GET /cart/count
#[instrument(skip(_state, session))]
pub async fn count(State(_state): State<AppState>, session: Session) -> Json<CartCountView> {
    let cart = SessionCartStore::new(session).load().await;
    Json(CartCountView {
        count: cart.item_count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use czarcar_core::product::{Product, ProductCategory};

    use super::*;

    fn product(id: &str, price: &str) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            description: String::new(),
            price: price.parse().unwrap(),
            original_price: None,
            discount: None,
            image: "/static/products/test.jpg".to_string(),
            category: ProductCategory::Electronics,
            rating: 4.0,
            reviews: 1,
            featured: false,
            in_stock: true,
            options: None,
        }
    }

    #[test]
    fn test_cart_view_formats_prices() {
        let mut cart = Cart::default();
        cart.add(product("1", "8.99"), None, None);
        let id = cart.add(product("2", "12.5"), None, None);
        cart.set_quantity(&id, 2);

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$33.99");

        let line = view.items.iter().find(|i| i.product_id == "2").unwrap();
        assert_eq!(line.price, "$12.50");
        assert_eq!(line.line_total, "$25.00");
    }

    #[test]
    fn test_cart_item_view_falls_back_to_product_image() {
        let mut cart = Cart::default();
        cart.add(product("1", "8.99"), None, None);

        let view = CartView::from(&cart);
        assert_eq!(
            view.items.first().unwrap().image.as_deref(),
            Some("/static/products/test.jpg")
        );
    }
}
