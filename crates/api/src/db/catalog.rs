//! `PostgreSQL` implementation of the catalog seam.

use async_trait::async_trait;
use sqlx::PgPool;

use nutrifolio_core::{GeoPoint, MaxDistance, MenuCategory, ProductId, StoreId, Tag};

use super::{
    MenuCategoryRepository, ProductRepository, RepositoryError, StoreRepository, TagRepository,
};
use crate::catalog::{Catalog, ProductFilter};
use crate::models::{Product, ProductDetails, StoreFilterView, StoreSummary};

/// Catalog backed by the `PostGIS` database.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn nearby_store_ids(
        &self,
        origin: GeoPoint,
        radius: MaxDistance,
    ) -> Result<Vec<StoreId>, RepositoryError> {
        StoreRepository::new(&self.pool)
            .nearby_ids(origin, radius)
            .await
    }

    async fn filter_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).filter(filter).await
    }

    async fn store_filter_view(
        &self,
        store_id: StoreId,
        origin: GeoPoint,
    ) -> Result<Option<StoreFilterView>, RepositoryError> {
        StoreRepository::new(&self.pool)
            .filter_view(store_id, origin)
            .await
    }

    async fn store_summary(
        &self,
        store_id: StoreId,
    ) -> Result<Option<StoreSummary>, RepositoryError> {
        StoreRepository::new(&self.pool).summary(store_id).await
    }

    async fn tags_for_product(&self, product_id: ProductId) -> Result<Vec<Tag>, RepositoryError> {
        TagRepository::new(&self.pool).for_product(product_id).await
    }

    async fn menu_categories_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<MenuCategory>, RepositoryError> {
        MenuCategoryRepository::new(&self.pool)
            .for_product(product_id)
            .await
    }

    async fn product_by_id(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).get_by_id(product_id).await
    }

    async fn product_details(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductDetails>, RepositoryError> {
        ProductRepository::new(&self.pool).details(product_id).await
    }

    async fn increment_view_count(
        &self,
        product_id: ProductId,
    ) -> Result<Option<i32>, RepositoryError> {
        ProductRepository::new(&self.pool)
            .increment_view_count(product_id)
            .await
    }

    async fn all_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        TagRepository::new(&self.pool).list_all().await
    }

    async fn all_menu_categories(&self) -> Result<Vec<MenuCategory>, RepositoryError> {
        MenuCategoryRepository::new(&self.pool).list_all().await
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
