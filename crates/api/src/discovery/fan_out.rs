//! Category fan-out.

use nutrifolio_core::{MenuCategory, MenuCategoryId};

use crate::models::{EnrichedProduct, ProductListing};

/// One product placed in one menu category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedListing {
    pub menu_category: MenuCategory,
    pub listing: ProductListing,
}

/// Emit one row per `(product, category)` where the category is one of the
/// product's own and was requested.
///
/// Each row owns a freshly built listing. Products in none of the requested
/// categories produce no rows. Rows keep product order, then the product's
/// category order.
#[must_use]
pub fn fan_out(
    products: &[EnrichedProduct],
    requested: &[MenuCategoryId],
) -> Vec<CategorizedListing> {
    products
        .iter()
        .flat_map(|product| {
            product
                .menu_categories
                .iter()
                .filter(|category| requested.contains(&category.id))
                .map(|category| CategorizedListing {
                    menu_category: category.clone(),
                    listing: product.listing(),
                })
        })
        .collect()
}
