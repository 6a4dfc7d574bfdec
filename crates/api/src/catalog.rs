//! The catalog seam between the HTTP layer and the relational store.
//!
//! Route handlers and the discovery pipeline only see `dyn Catalog`. The
//! production implementation is [`crate::db::PgCatalog`]; tests substitute an
//! in-memory catalog that applies [`ProductFilter::accepts`] directly.

use std::collections::BTreeSet;

use async_trait::async_trait;
use rust_decimal::Decimal;

use nutrifolio_core::{
    GeoPoint, MaxDistance, MenuCategory, MenuCategoryId, ProductId, StoreId, Tag, TagId,
};

use crate::db::RepositoryError;
use crate::models::{Product, ProductDetails, StoreFilterView, StoreSummary};

/// Criteria for selecting products across a set of candidate stores.
///
/// Tag ids combine with AND, menu category ids with OR. Id lists are
/// deduplicated and sorted on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    store_ids: Vec<StoreId>,
    tag_ids: Vec<TagId>,
    menu_category_ids: Vec<MenuCategoryId>,
    min_price: Decimal,
    max_price: Decimal,
}

impl ProductFilter {
    #[must_use]
    pub fn new(
        store_ids: impl IntoIterator<Item = StoreId>,
        tag_ids: impl IntoIterator<Item = TagId>,
        menu_category_ids: impl IntoIterator<Item = MenuCategoryId>,
        min_price: Decimal,
        max_price: Decimal,
    ) -> Self {
        Self {
            store_ids: distinct(store_ids),
            tag_ids: distinct(tag_ids),
            menu_category_ids: distinct(menu_category_ids),
            min_price,
            max_price,
        }
    }

    #[must_use]
    pub fn store_ids(&self) -> &[StoreId] {
        &self.store_ids
    }

    #[must_use]
    pub fn tag_ids(&self) -> &[TagId] {
        &self.tag_ids
    }

    #[must_use]
    pub fn menu_category_ids(&self) -> &[MenuCategoryId] {
        &self.menu_category_ids
    }

    #[must_use]
    pub const fn min_price(&self) -> Decimal {
        self.min_price
    }

    #[must_use]
    pub const fn max_price(&self) -> Decimal {
        self.max_price
    }

    /// True when no product can match, so the query can be skipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store_ids.is_empty() || self.menu_category_ids.is_empty()
    }

    /// Whether a product with the given relations passes this filter.
    ///
    /// An empty tag list is satisfied by every product.
    #[must_use]
    pub fn accepts(
        &self,
        product: &Product,
        product_tags: &[TagId],
        product_categories: &[MenuCategoryId],
    ) -> bool {
        product.is_public
            && self.store_ids.binary_search(&product.store_id).is_ok()
            && product.price >= self.min_price
            && product.price <= self.max_price
            && self.tag_ids.iter().all(|tag| product_tags.contains(tag))
            && product_categories
                .iter()
                .any(|category| self.menu_category_ids.binary_search(category).is_ok())
    }
}

fn distinct<T: Ord>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Read access to stores, products and their relations.
///
/// Implementations must be parameterized against injection and must never
/// return products with `is_public = false` from [`Catalog::filter_products`].
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Ids of stores within `radius` of `origin` (geodesic), ascending.
    async fn nearby_store_ids(
        &self,
        origin: GeoPoint,
        radius: MaxDistance,
    ) -> Result<Vec<StoreId>, RepositoryError>;

    /// Public products matching `filter`, ascending by id.
    async fn filter_products(&self, filter: &ProductFilter)
    -> Result<Vec<Product>, RepositoryError>;

    /// Store display info with distance from `origin` in kilometres.
    async fn store_filter_view(
        &self,
        store_id: StoreId,
        origin: GeoPoint,
    ) -> Result<Option<StoreFilterView>, RepositoryError>;

    async fn store_summary(&self, store_id: StoreId)
    -> Result<Option<StoreSummary>, RepositoryError>;

    /// All tags on a product, ascending by id.
    async fn tags_for_product(&self, product_id: ProductId) -> Result<Vec<Tag>, RepositoryError>;

    /// All menu categories of a product, ascending by id.
    async fn menu_categories_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<MenuCategory>, RepositoryError>;

    /// A product regardless of visibility.
    async fn product_by_id(&self, product_id: ProductId)
    -> Result<Option<Product>, RepositoryError>;

    async fn product_details(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductDetails>, RepositoryError>;

    /// Increment the view counter, returning the new value (`None` if the
    /// product no longer exists).
    async fn increment_view_count(
        &self,
        product_id: ProductId,
    ) -> Result<Option<i32>, RepositoryError>;

    async fn all_tags(&self) -> Result<Vec<Tag>, RepositoryError>;

    async fn all_menu_categories(&self) -> Result<Vec<MenuCategory>, RepositoryError>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(store: i32, price: Decimal, is_public: bool) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Chicken Sandwich".to_string(),
            description: None,
            image_url: None,
            price,
            view_count: 0,
            has_details: false,
            is_public,
            store_id: StoreId::new(store),
        }
    }

    fn filter(tags: &[i32], categories: &[i32]) -> ProductFilter {
        ProductFilter::new(
            [StoreId::new(1), StoreId::new(2)],
            tags.iter().copied().map(TagId::new),
            categories.iter().copied().map(MenuCategoryId::new),
            Decimal::ZERO,
            Decimal::new(10, 0),
        )
    }

    #[test]
    fn test_new_dedups_and_sorts() {
        let f = ProductFilter::new(
            [StoreId::new(3), StoreId::new(1), StoreId::new(3)],
            [TagId::new(2), TagId::new(2), TagId::new(1)],
            [MenuCategoryId::new(1)],
            Decimal::ZERO,
            Decimal::ONE,
        );
        assert_eq!(f.store_ids(), [StoreId::new(1), StoreId::new(3)]);
        assert_eq!(f.tag_ids(), [TagId::new(1), TagId::new(2)]);
    }

    #[test]
    fn test_tags_are_and() {
        let f = filter(&[1, 4], &[1]);
        let p = product(1, Decimal::ONE, true);
        let categories = [MenuCategoryId::new(1)];

        assert!(f.accepts(&p, &[TagId::new(1), TagId::new(4), TagId::new(7)], &categories));
        assert!(!f.accepts(&p, &[TagId::new(1)], &categories));
    }

    #[test]
    fn test_empty_tags_accept_everything() {
        let f = filter(&[], &[1]);
        let p = product(2, Decimal::ONE, true);
        assert!(f.accepts(&p, &[], &[MenuCategoryId::new(1)]));
    }

    #[test]
    fn test_categories_are_or() {
        let f = filter(&[], &[1, 2]);
        let p = product(1, Decimal::ONE, true);

        assert!(f.accepts(&p, &[], &[MenuCategoryId::new(2)]));
        assert!(!f.accepts(&p, &[], &[MenuCategoryId::new(3)]));
        assert!(!f.accepts(&p, &[], &[]));
    }

    #[test]
    fn test_price_bounds_inclusive() {
        let f = filter(&[], &[1]);
        let categories = [MenuCategoryId::new(1)];

        assert!(f.accepts(&product(1, Decimal::ZERO, true), &[], &categories));
        assert!(f.accepts(&product(1, Decimal::new(10, 0), true), &[], &categories));
        assert!(!f.accepts(&product(1, Decimal::new(1001, 2), true), &[], &categories));
    }

    #[test]
    fn test_rejects_private_and_foreign_store() {
        let f = filter(&[], &[1]);
        let categories = [MenuCategoryId::new(1)];

        assert!(!f.accepts(&product(1, Decimal::ONE, false), &[], &categories));
        assert!(!f.accepts(&product(9, Decimal::ONE, true), &[], &categories));
    }

    #[test]
    fn test_is_empty() {
        assert!(filter(&[], &[]).is_empty());
        let no_stores = ProductFilter::new(
            [],
            [],
            [MenuCategoryId::new(1)],
            Decimal::ZERO,
            Decimal::ONE,
        );
        assert!(no_stores.is_empty());
        assert!(!filter(&[], &[1]).is_empty());
    }
}
