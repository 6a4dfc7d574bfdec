//! Database operations for the marketplace `PostgreSQL` (`PostGIS`) database.
//!
//! ## Tables
//!
//! - `stores` - Vendor profiles with a GiST-indexed `geography` location
//! - `products` - Catalog entries, one owning store each
//! - `product_details` - Optional nutrition facts (one row per product)
//! - `tags` / `menu_categories` - Seeded reference sets
//! - `product_tags` / `product_menu_categories` - Join rows, cascade on delete
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/`, embedded at compile
//! time, and applied at start-up only when `NUTRIFOLIO_RUN_MIGRATIONS=true`.

pub mod catalog;
pub mod menu_categories;
pub mod products;
pub mod stores;
pub mod tags;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use catalog::PgCatalog;
pub use menu_categories::MenuCategoryRepository;
pub use products::ProductRepository;
pub use stores::StoreRepository;
pub use tags::TagRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
