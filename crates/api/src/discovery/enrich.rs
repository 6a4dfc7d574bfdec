//! Enrichment: attach store view, tags and menu categories to products.

use std::collections::HashMap;

use tracing::warn;

use nutrifolio_core::{GeoPoint, StoreId};

use crate::catalog::Catalog;
use crate::db::RepositoryError;
use crate::models::{EnrichedProduct, Product, StoreFilterView};

/// Decorate each product with its store's distance from `origin` and its
/// full tag and menu-category lists.
///
/// Relations are fetched one product at a time; store views are fetched once
/// per store. A product whose store has disappeared since filtering is
/// dropped with a warning.
///
/// # Errors
///
/// Returns the first `RepositoryError` from the catalog; no partial result is
/// produced.
pub async fn enrich(
    catalog: &dyn Catalog,
    products: Vec<Product>,
    origin: GeoPoint,
) -> Result<Vec<EnrichedProduct>, RepositoryError> {
    let mut stores: HashMap<StoreId, Option<StoreFilterView>> = HashMap::new();
    let mut enriched = Vec::with_capacity(products.len());

    for product in products {
        let store = match stores.get(&product.store_id) {
            Some(view) => view.clone(),
            None => {
                let view = catalog.store_filter_view(product.store_id, origin).await?;
                stores.insert(product.store_id, view.clone());
                view
            }
        };
        let Some(store) = store else {
            warn!(
                product_id = %product.id,
                store_id = %product.store_id,
                "Store missing during enrichment, skipping product"
            );
            continue;
        };

        let tags = catalog.tags_for_product(product.id).await?;
        let menu_categories = catalog.menu_categories_for_product(product.id).await?;

        enriched.push(EnrichedProduct {
            product,
            store,
            tags,
            menu_categories,
        });
    }

    Ok(enriched)
}
