//! The product catalog.
//!
//! Static data embedded at build time. Products are defined at deploy time
//! and immutable at runtime; there is nothing to cache or invalidate.

use std::sync::LazyLock;

use czarcar_core::product::{Product, ProductCategory};

static CATALOG: LazyLock<Vec<Product>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("../data/catalog.json")).expect("embedded catalog is valid")
});

/// All products, in catalog order.
#[must_use]
pub fn all() -> &'static [Product] {
    &CATALOG
}

/// Products flagged for the home page.
#[must_use]
pub fn featured() -> Vec<&'static Product> {
    CATALOG.iter().filter(|p| p.featured).collect()
}

/// Look up a product by id.
#[must_use]
pub fn by_id(id: &str) -> Option<&'static Product> {
    CATALOG.iter().find(|p| p.id == id)
}

/// Products in a category.
#[must_use]
pub fn by_category(category: ProductCategory) -> Vec<&'static Product> {
    CATALOG.iter().filter(|p| p.category == category).collect()
}

/// Case-insensitive keyword search over name, description, and category.
#[must_use]
pub fn search(query: &str) -> Vec<&'static Product> {
    let needle = query.to_lowercase();
    CATALOG
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.description.to_lowercase().contains(&needle)
                || p.category.as_str().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_parses_and_is_nonempty() {
        assert!(!all().is_empty());
    }

    #[test]
    fn test_product_ids_are_unique() {
        let mut ids: Vec<&str> = all().iter().map(|p| p.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all().len());
    }

    #[test]
    fn test_by_id() {
        let product = by_id("1").expect("product 1 exists");
        assert_eq!(product.id, "1");
        assert!(by_id("does-not-exist").is_none());
    }

    #[test]
    fn test_featured_subset() {
        let featured = featured();
        assert!(!featured.is_empty());
        assert!(featured.iter().all(|p| p.featured));
        assert!(featured.len() < all().len());
    }

    #[test]
    fn test_by_category() {
        let lighting = by_category(ProductCategory::Lighting);
        assert!(!lighting.is_empty());
        assert!(
            lighting
                .iter()
                .all(|p| p.category == ProductCategory::Lighting)
        );
    }

    #[test]
    fn test_search_matches_name_and_category() {
        assert!(!search("LED").is_empty());
        assert!(!search("detailing").is_empty());
        assert!(search("quantum flux capacitor").is_empty());
    }
}
