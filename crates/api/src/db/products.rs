//! Product repository for database operations.
//!
//! Queries are built at runtime with bound parameters; id lists are bound as
//! `int4[]` and matched with `= ANY(...)`.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use nutrifolio_core::{ProductId, raw_ids};

use super::RepositoryError;
use crate::catalog::ProductFilter;
use crate::models::{Product, ProductDetails};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.image_url, p.price, \
                               p.view_count, p.has_details, p.is_public, p.store_id";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Public products across the filter's stores carrying every requested
    /// tag and at least one requested menu category, ascending by id.
    ///
    /// The tag condition counts distinct matched tags and compares against
    /// the number requested, so an empty tag list matches every product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn filter(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM products AS p
            WHERE p.store_id = ANY($1)
              AND p.is_public = TRUE
              AND p.price BETWEEN $4 AND $5
              AND (
                  SELECT COUNT(DISTINCT pt.tag_id)
                  FROM product_tags AS pt
                  WHERE pt.product_id = p.id
                    AND pt.tag_id = ANY($2)
              ) = cardinality($2::int4[])
              AND EXISTS (
                  SELECT 1
                  FROM product_menu_categories AS pmc
                  WHERE pmc.product_id = p.id
                    AND pmc.menu_category_id = ANY($3)
              )
            ORDER BY p.id
            "
        );

        let rows = sqlx::query(&sql)
            .bind(raw_ids(filter.store_ids()))
            .bind(raw_ids(filter.tag_ids()))
            .bind(raw_ids(filter.menu_category_ids()))
            .bind(filter.min_price())
            .bind(filter.max_price())
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(product_from_row).collect()
    }

    /// Get a product by id, whatever its visibility.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products AS p WHERE p.id = $1");

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(product_from_row).transpose()
    }

    /// Nutrition facts for a product, if recorded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn details(&self, id: ProductId) -> Result<Option<ProductDetails>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT calories, protein, carbs, fiber, sugars, fat, saturated_fat
            FROM product_details
            WHERE product_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        Ok(Some(ProductDetails {
            calories: r.try_get("calories")?,
            protein: r.try_get("protein")?,
            carbs: r.try_get("carbs")?,
            fiber: r.try_get("fiber")?,
            sugars: r.try_get("sugars")?,
            fat: r.try_get("fat")?,
            saturated_fat: r.try_get("saturated_fat")?,
        }))
    }

    /// Add one to the view counter and return the new count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn increment_view_count(&self, id: ProductId) -> Result<Option<i32>, RepositoryError> {
        let count = sqlx::query_scalar::<_, i32>(
            r"
            UPDATE products
            SET view_count = view_count + 1
            WHERE id = $1
            RETURNING view_count
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(count)
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, RepositoryError> {
    let view_count: i32 = row.try_get("view_count")?;
    if view_count < 0 {
        return Err(RepositoryError::DataCorruption(format!(
            "negative view_count {view_count} in database"
        )));
    }

    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        image_url: row.try_get("image_url")?,
        price: row.try_get("price")?,
        view_count,
        has_details: row.try_get("has_details")?,
        is_public: row.try_get("is_public")?,
        store_id: row.try_get("store_id")?,
    })
}
