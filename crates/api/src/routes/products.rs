//! Product route handlers.

use axum::{
    Json,
    extract::{Path, RawQuery, State},
};
use serde::Serialize;

use nutrifolio_core::ProductId;

use crate::db::RepositoryError;
use crate::discovery::{DiscoveryPipeline, DiscoveryQuery, ProductsByMenuCategories};
use crate::error::{AppError, Result};
use crate::models::ProductDetailed;
use crate::state::AppState;

/// Response body of the single-product lookup.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: ProductDetailed,
}

/// Discover products from stores near a point, grouped by menu category.
///
/// Validation runs before any query; a rejected request touches neither the
/// cache nor the database.
#[tracing::instrument(skip_all)]
pub async fn filter_products_from_nearby_stores(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Result<Json<ProductsByMenuCategories>> {
    let query = DiscoveryQuery::parse(raw.as_deref().unwrap_or_default(), state.reference())
        .map_err(AppError::Validation)?;

    let pipeline = DiscoveryPipeline::new(state.catalog(), state.nearby_cache());
    let body = pipeline
        .run_with_timeout(&query, state.config().discovery_timeout)
        .await?;

    Ok(Json(body))
}

/// Fetch one public product and count the view.
///
/// The view is counted only after every read has succeeded. Unknown and
/// non-public products are indistinguishable to the caller.
#[tracing::instrument(skip_all)]
pub async fn get_product_by_id(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ProductResponse>> {
    let id = parse_product_id(&raw_id)?;
    let catalog = state.catalog();
    let not_found = || AppError::NotFound(format!("There is no product with the id of {id}"));

    let product = catalog
        .product_by_id(id)
        .await?
        .filter(|p| p.is_public)
        .ok_or_else(not_found)?;

    let store = catalog
        .store_summary(product.store_id)
        .await?
        .ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "product {id} references missing store {}",
                product.store_id
            ))
        })?;

    let details = if product.has_details {
        catalog.product_details(id).await?
    } else {
        None
    };
    let tags = catalog.tags_for_product(id).await?;
    let menu_categories = catalog.menu_categories_for_product(id).await?;

    let view_count = catalog
        .increment_view_count(id)
        .await?
        .ok_or_else(not_found)?;

    tracing::debug!(product_id = %id, view_count, "Product viewed");

    Ok(Json(ProductResponse {
        product: ProductDetailed {
            id: product.id,
            name: product.name,
            description: product.description,
            image_url: product.image_url,
            price: product.price,
            is_public: product.is_public,
            store_id: product.store_id,
            view_count,
            store,
            details,
            tags,
            menu_categories,
        },
    }))
}

fn parse_product_id(raw: &str) -> Result<ProductId> {
    match raw.parse::<i32>() {
        Ok(id) if id >= 1 => Ok(ProductId::new(id)),
        Ok(_) => Err(AppError::invalid("product_id", "must be at least 1")),
        Err(_) => Err(AppError::invalid("product_id", "must be an integer")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_product_id() {
        assert_eq!(parse_product_id("42").unwrap(), ProductId::new(42));
        assert!(matches!(parse_product_id("0"), Err(AppError::Validation(_))));
        assert!(matches!(parse_product_id("-3"), Err(AppError::Validation(_))));
        assert!(matches!(parse_product_id("abc"), Err(AppError::Validation(_))));
        assert!(matches!(parse_product_id("99999999999"), Err(AppError::Validation(_))));
    }
}
