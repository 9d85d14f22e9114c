//! Catalog product types.
//!
//! Products are static data defined at deploy time; the storefront embeds
//! the catalog and never mutates it at runtime.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Top-level product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Lighting,
    Electronics,
    Detailing,
}

impl ProductCategory {
    /// The lowercase identifier used in URLs and the catalog data file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lighting => "lighting",
            Self::Electronics => "electronics",
            Self::Detailing => "detailing",
        }
    }
}

/// Selectable variant axes for a product.
///
/// Empty axes are omitted from the catalog data; a product with no options
/// at all carries `options: null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lengths: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plug_types: Vec<String>,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price in major currency units (store currency).
    pub price: Decimal,
    /// Pre-discount price, when the product is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    /// Discount percentage, when the product is on sale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u32>,
    pub image: String,
    pub category: ProductCategory,
    pub rating: f32,
    pub reviews: u32,
    pub featured: bool,
    pub in_stock: bool,
    /// Variant axes the shopper can pick from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ProductOptions>,
}
