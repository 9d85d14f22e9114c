//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use czarcar_core::product::{Product, ProductCategory};

use crate::catalog;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Category filter; "all" or absent lists everything.
    pub category: Option<String>,
    /// Keyword search over name, description, and category.
    pub q: Option<String>,
}

/// List products, optionally filtered.
///
/// GET /products
#[instrument(skip(_state))]
pub async fn index(
    State(_state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
        return Ok(Json(catalog::search(q).into_iter().cloned().collect()));
    }

    let products = match query.category.as_deref() {
        None | Some("all" | "") => catalog::all().to_vec(),
        Some(raw) => {
            let category = parse_category(raw)?;
            catalog::by_category(category).into_iter().cloned().collect()
        }
    };

    Ok(Json(products))
}

/// List featured products.
///
/// GET /products/featured
#[instrument(skip(_state))]
pub async fn featured(State(_state): State<AppState>) -> Json<Vec<Product>> {
    Json(catalog::featured().into_iter().cloned().collect())
}

/// Fetch a single product.
///
/// GET /products/{id}
#[instrument(skip(_state))]
pub async fn show(
    State(_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    catalog::by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No product with id {id}")))
}

/// Parse a category slug from the query string.
fn parse_category(raw: &str) -> Result<ProductCategory> {
    match raw {
        "lighting" => Ok(ProductCategory::Lighting),
        "electronics" => Ok(ProductCategory::Electronics),
        "detailing" => Ok(ProductCategory::Detailing),
        other => Err(AppError::BadRequest(format!("Unknown category: {other}"))),
    }
}
