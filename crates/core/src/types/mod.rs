//! Core types for CzarCar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod currency;
pub mod email;
pub mod order;
pub mod product;

pub use cart::{Cart, CartItem, SelectedOptions};
pub use email::{Email, EmailError};
pub use order::{OrderEmailData, OrderItem, ShippingAddress};
pub use product::{Product, ProductCategory, ProductOptions};
