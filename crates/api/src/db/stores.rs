//! Store repository: radius queries and store views.
//!
//! Points are built as `ST_SetSRID(ST_MakePoint(lng, lat), 4326)::geography`
//! so both `ST_DWithin` and `ST_Distance` work in metres on the spheroid and
//! `ST_DWithin` can use the GiST index on `stores.location`.

use sqlx::{PgPool, Row};

use nutrifolio_core::{GeoPoint, MaxDistance, StoreId};

use super::RepositoryError;
use crate::models::{StoreFilterView, StoreSummary};

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Ids of all stores located within `radius` of `origin`, ascending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn nearby_ids(
        &self,
        origin: GeoPoint,
        radius: MaxDistance,
    ) -> Result<Vec<StoreId>, RepositoryError> {
        let ids = sqlx::query_scalar::<_, StoreId>(
            r"
            SELECT id
            FROM stores
            WHERE ST_DWithin(
                location,
                ST_SetSRID(ST_MakePoint($2, $1), 4326)::geography,
                $3
            )
            ORDER BY id
            ",
        )
        .bind(origin.lat())
        .bind(origin.lng())
        .bind(radius.meters())
        .fetch_all(self.pool)
        .await?;

        Ok(ids)
    }

    /// Store display info with its distance from `origin` in kilometres.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn filter_view(
        &self,
        id: StoreId,
        origin: GeoPoint,
    ) -> Result<Option<StoreFilterView>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, name, logo_url,
                   ST_Distance(
                       location,
                       ST_SetSRID(ST_MakePoint($3, $2), 4326)::geography
                   ) / 1000.0 AS distance_km
            FROM stores
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(origin.lat())
        .bind(origin.lng())
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        Ok(Some(StoreFilterView {
            id: r.try_get("id")?,
            name: r.try_get("name")?,
            logo_url: r.try_get("logo_url")?,
            distance_km: r.try_get("distance_km")?,
        }))
    }

    /// Store profile for the single-product page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(&self, id: StoreId) -> Result<Option<StoreSummary>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, name, logo_url, address, lat, lng
            FROM stores
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        Ok(Some(StoreSummary {
            id: r.try_get("id")?,
            name: r.try_get("name")?,
            logo_url: r.try_get("logo_url")?,
            address: r.try_get("address")?,
            lat: r.try_get("lat")?,
            lng: r.try_get("lng")?,
        }))
    }
}
