//! In-process nearby-store cache backed by `moka`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use nutrifolio_core::StoreId;

use super::{CacheError, CacheLookup, NearbyStoreCache, NearbyStoreKey};

/// Nearby-store cache local to this process.
///
/// An empty id slice is a legitimate value here, so no marker is needed.
#[derive(Clone)]
pub struct MokaNearbyStoreCache {
    cache: Cache<NearbyStoreKey, Arc<[StoreId]>>,
}

impl MokaNearbyStoreCache {
    #[must_use]
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl NearbyStoreCache for MokaNearbyStoreCache {
    async fn lookup(&self, key: &NearbyStoreKey) -> Result<CacheLookup, CacheError> {
        Ok(match self.cache.get(key).await {
            Some(ids) if ids.is_empty() => CacheLookup::EmptyHit,
            Some(ids) => CacheLookup::Hit(ids.to_vec()),
            None => CacheLookup::Miss,
        })
    }

    async fn store(&self, key: &NearbyStoreKey, store_ids: &[StoreId]) -> Result<(), CacheError> {
        self.cache.insert(*key, Arc::from(store_ids)).await;
        Ok(())
    }
}
