//! Cart persistence.
//!
//! The cart container itself is pure data (`czarcar_core::cart`); this
//! module is the injected storage seam. Production uses the shopper's
//! session: the whole cart is serialized under a single key, so each
//! browser session owns its own store and there is no cross-session
//! contention.

use std::future::Future;

use czarcar_core::cart::Cart;
use tower_sessions::Session;

/// Session key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Storage seam for the cart container.
pub trait CartStorage {
    /// Load the cart, or an empty one if none is stored.
    fn load(&self) -> impl Future<Output = Cart> + Send;

    /// Persist the cart.
    fn save(&self, cart: &Cart) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Error persisting a cart.
#[derive(Debug, thiserror::Error)]
#[error("cart storage error: {0}")]
pub struct StorageError(String);

/// Session-backed cart storage.
pub struct SessionCartStore {
    session: Session,
}

impl SessionCartStore {
    /// Wrap a request session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStorage for SessionCartStore {
    async fn load(&self) -> Cart {
        self.session
            .get::<Cart>(CART_KEY)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }

    async fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        self.session
            .insert(CART_KEY, cart)
            .await
            .map_err(|e| StorageError(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::{Cart, CartStorage, StorageError};

    /// In-memory storage for exercising cart flows without a session layer.
    #[derive(Default)]
    pub struct MemoryCartStore {
        cart: Mutex<Cart>,
    }

    impl CartStorage for MemoryCartStore {
        async fn load(&self) -> Cart {
            self.cart.lock().map(|c| c.clone()).unwrap_or_default()
        }

        async fn save(&self, cart: &Cart) -> Result<(), StorageError> {
            *self
                .cart
                .lock()
                .map_err(|e| StorageError(e.to_string()))? = cart.clone();
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use czarcar_core::product::{Product, ProductCategory};

    use super::testing::MemoryCartStore;
    use super::*;

    fn product() -> Product {
        Product {
            id: "1".to_string(),
            name: "Car Phone Holder".to_string(),
            description: String::new(),
            price: "8.99".parse().unwrap(),
            original_price: None,
            discount: None,
            image: String::new(),
            category: ProductCategory::Electronics,
            rating: 4.5,
            reviews: 1,
            featured: false,
            in_stock: true,
            options: None,
        }
    }

    #[tokio::test]
    async fn test_load_save_round_trip() {
        let store = MemoryCartStore::default();

        let mut cart = store.load().await;
        assert!(cart.is_empty());

        cart.add(product(), None, None);
        store.save(&cart).await.unwrap();

        let reloaded = store.load().await;
        assert_eq!(reloaded, cart);
        assert_eq!(reloaded.item_count(), 1);
    }
}
