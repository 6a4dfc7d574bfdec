//! Menu category repository for database operations.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use nutrifolio_core::{MenuCategory, ProductId};

use super::RepositoryError;

/// Repository for menu category database operations.
pub struct MenuCategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MenuCategoryRepository<'a> {
    /// Create a new menu category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The full seeded category set, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<MenuCategory>, RepositoryError> {
        let rows = sqlx::query("SELECT id, label, description FROM menu_categories ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(menu_category_from_row).collect()
    }

    /// Categories a product belongs to, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<MenuCategory>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT mc.id, mc.label, mc.description
            FROM menu_categories AS mc
                INNER JOIN product_menu_categories AS pmc ON pmc.menu_category_id = mc.id
            WHERE pmc.product_id = $1
            ORDER BY mc.id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(menu_category_from_row).collect()
    }
}

fn menu_category_from_row(row: &PgRow) -> Result<MenuCategory, RepositoryError> {
    Ok(MenuCategory {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
        description: row.try_get("description")?,
    })
}
