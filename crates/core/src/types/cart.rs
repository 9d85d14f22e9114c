//! The cart container.
//!
//! `Cart` is a plain data structure with no I/O: the storefront injects a
//! storage backend (session-based in production) that loads and saves the
//! whole container. Each shopper session owns exactly one cart, so there is
//! no concurrent-writer contention to manage here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Options the shopper picked when adding a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plug_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl SelectedOptions {
    /// Display label joining the chosen values, e.g. "Blue / 3M / USB Plug".
    ///
    /// Returns `None` when nothing was selected.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let values: Vec<&str> = [
            self.color.as_deref(),
            self.model.as_deref(),
            self.length.as_deref(),
            self.plug_type.as_deref(),
            self.mode.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(" / "))
        }
    }

    /// Whether any option was selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.color.is_none()
            && self.model.is_none()
            && self.length.is_none()
            && self.plug_type.is_none()
            && self.mode.is_none()
    }
}

/// A single cart line: a product snapshot plus quantity and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line id, unique within the cart (product id + random suffix).
    pub id: String,
    /// Owned snapshot of the product at add-to-cart time.
    pub product: Product,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_options: Option<SelectedOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_image: Option<String>,
}

impl CartItem {
    /// Line total: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// The cart: an ordered list of lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Add one unit of a product with the given options.
    ///
    /// A line with the same product and the same option selection is merged
    /// by bumping its quantity; otherwise a new line is appended. Returns the
    /// id of the affected line.
    pub fn add(
        &mut self,
        product: Product,
        selected_options: Option<SelectedOptions>,
        option_image: Option<String>,
    ) -> String {
        let selected_options = selected_options.filter(|o| !o.is_empty());

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id && item.selected_options == selected_options)
        {
            existing.quantity += 1;
            return existing.id.clone();
        }

        let id = format!("{}-{}", product.id, uuid::Uuid::new_v4());
        let option_label = selected_options.as_ref().and_then(SelectedOptions::label);
        self.items.push(CartItem {
            id: id.clone(),
            product,
            quantity: 1,
            selected_options,
            option_label,
            option_image,
        });
        id
    }

    /// Remove a line by id. Unknown ids are ignored.
    pub fn remove(&mut self, item_id: &str) {
        self.items.retain(|item| item.id != item_id);
    }

    /// Set a line's quantity. Zero removes the line; unknown ids are ignored.
    pub fn set_quantity(&mut self, item_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(item_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.id == item_id) {
            item.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
