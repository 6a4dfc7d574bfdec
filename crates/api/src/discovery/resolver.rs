//! Nearby-store resolution with cache-aside.

use tracing::{debug, warn};

use nutrifolio_core::{GeoPoint, MaxDistance, StoreId};

use crate::cache::{CacheError, NearbyStoreCache, NearbyStoreKey};
use crate::catalog::Catalog;
use crate::db::RepositoryError;

/// Resolves the stores within a radius bucket of a point.
///
/// The cache is consulted first. On a miss the catalog is queried with the
/// key's quantized origin and the result is written back. A corrupt entry
/// is treated as a miss and overwritten. Cache failures never fail the
/// request: when the backend is unreachable the catalog is queried directly
/// and nothing is written.
pub struct NearbyStoreResolver<'a> {
    catalog: &'a dyn Catalog,
    cache: &'a dyn NearbyStoreCache,
}

impl<'a> NearbyStoreResolver<'a> {
    #[must_use]
    pub const fn new(catalog: &'a dyn Catalog, cache: &'a dyn NearbyStoreCache) -> Self {
        Self { catalog, cache }
    }

    /// Store ids near `origin`, ascending.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the geospatial query fails.
    pub async fn resolve(
        &self,
        origin: GeoPoint,
        radius: MaxDistance,
    ) -> Result<Vec<StoreId>, RepositoryError> {
        let key = NearbyStoreKey::new(origin, radius);

        let write_back = match self.cache.lookup(&key).await {
            Ok(lookup) => {
                if let Some(store_ids) = lookup.into_store_ids() {
                    debug!(cache_key = %key, store_count = store_ids.len(), "Nearby stores from cache");
                    return Ok(store_ids);
                }
                true
            }
            Err(e @ CacheError::Corrupt(_)) => {
                warn!(
                    error = %e,
                    cache_key = %key,
                    "Discarding corrupt nearby-store cache entry"
                );
                true
            }
            Err(e @ CacheError::Redis(_)) => {
                warn!(
                    error = %e,
                    cache_key = %key,
                    "Nearby-store cache lookup failed, querying database directly"
                );
                false
            }
        };

        let store_ids = self.catalog.nearby_store_ids(key.origin(), radius).await?;
        debug!(cache_key = %key, store_count = store_ids.len(), "Nearby stores from database");

        if write_back && let Err(e) = self.cache.store(&key, &store_ids).await {
            warn!(error = %e, cache_key = %key, "Failed to populate nearby-store cache");
        }

        Ok(store_ids)
    }
}
