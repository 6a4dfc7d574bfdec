//! Tag repository for database operations.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use nutrifolio_core::{ProductId, Tag};

use super::RepositoryError;

/// Repository for tag database operations.
pub struct TagRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepository<'a> {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The full seeded tag set, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Tag>, RepositoryError> {
        let rows = sqlx::query("SELECT id, label, description FROM tags ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        rows.iter().map(tag_from_row).collect()
    }

    /// Tags attached to a product, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn for_product(&self, product_id: ProductId) -> Result<Vec<Tag>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT t.id, t.label, t.description
            FROM tags AS t
                INNER JOIN product_tags AS pt ON pt.tag_id = t.id
            WHERE pt.product_id = $1
            ORDER BY t.id
            ",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(tag_from_row).collect()
    }
}

fn tag_from_row(row: &PgRow) -> Result<Tag, RepositoryError> {
    Ok(Tag {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
        description: row.try_get("description")?,
    })
}
