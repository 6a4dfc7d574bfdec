//! Nearby-store product discovery.
//!
//! A request flows through five stages:
//!
//! 1. [`NearbyStoreResolver`] finds stores within the radius (cache-aside)
//! 2. the catalog filters public products by price, tags and categories
//! 3. [`enrich`] attaches store distance, tags and categories
//! 4. [`fan_out`] emits one row per requested category a product is in
//! 5. [`group_and_sort`] buckets rows by category and orders each bucket
//!
//! Any stage failure fails the whole request; there are no partial results.

pub mod enrich;
pub mod fan_out;
pub mod group;
pub mod params;
pub mod resolver;

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::cache::NearbyStoreCache;
use crate::catalog::{Catalog, ProductFilter};
use crate::db::RepositoryError;

pub use self::enrich::enrich;
pub use self::fan_out::{CategorizedListing, fan_out};
pub use self::group::{CategoryBucket, group_and_sort};
pub use self::params::DiscoveryQuery;
pub use self::resolver::NearbyStoreResolver;

/// Errors from the discovery pipeline.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("discovery timed out after {0:?}")]
    Timeout(Duration),
}

/// Response body of the discovery endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductsByMenuCategories {
    pub products_by_menu_categories: Vec<CategoryBucket>,
}

/// Runs a validated [`DiscoveryQuery`] against a catalog and cache.
pub struct DiscoveryPipeline<'a> {
    catalog: &'a dyn Catalog,
    cache: &'a dyn NearbyStoreCache,
}

impl<'a> DiscoveryPipeline<'a> {
    #[must_use]
    pub const fn new(catalog: &'a dyn Catalog, cache: &'a dyn NearbyStoreCache) -> Self {
        Self { catalog, cache }
    }

    /// Execute every stage.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::Repository` if any catalog call fails.
    #[instrument(skip_all, fields(max_dist = %query.max_dist, sort_by = query.sort_by.as_str()))]
    pub async fn run(
        &self,
        query: &DiscoveryQuery,
    ) -> Result<ProductsByMenuCategories, DiscoveryError> {
        let store_ids = NearbyStoreResolver::new(self.catalog, self.cache)
            .resolve(query.origin, query.max_dist)
            .await?;

        if store_ids.is_empty() {
            tracing::debug!("No stores in range");
            return Ok(ProductsByMenuCategories {
                products_by_menu_categories: Vec::new(),
            });
        }

        let filter = ProductFilter::new(
            store_ids,
            query.tag_ids.iter().copied(),
            query.menu_category_ids.iter().copied(),
            query.min_price,
            query.max_price,
        );
        let products = self.catalog.filter_products(&filter).await?;
        let product_count = products.len();

        let enriched = enrich(self.catalog, products, query.origin).await?;
        let rows = fan_out(&enriched, filter.menu_category_ids());
        let buckets = group_and_sort(rows, query.sort_by, query.sort_order);

        tracing::debug!(
            product_count,
            bucket_count = buckets.len(),
            "Discovery complete"
        );

        Ok(ProductsByMenuCategories {
            products_by_menu_categories: buckets,
        })
    }

    /// [`Self::run`] bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `DiscoveryError::Timeout` if the deadline passes first.
    pub async fn run_with_timeout(
        &self,
        query: &DiscoveryQuery,
        timeout: Duration,
    ) -> Result<ProductsByMenuCategories, DiscoveryError> {
        tokio::time::timeout(timeout, self.run(query))
            .await
            .map_err(|_| DiscoveryError::Timeout(timeout))?
    }
}
