//! Nearby-store cache.
//!
//! Cache-aside storage for the store ids found within a radius of a point.
//! Entries are advisory: every value is a pure function of its key, so
//! concurrent writers race harmlessly and a missing or expired entry only
//! costs a geospatial query.
//!
//! Two backends implement [`NearbyStoreCache`]:
//!
//! - [`RedisNearbyStoreCache`] - shared across processes, used when
//!   `NUTRIFOLIO_REDIS_URL` is set
//! - [`MokaNearbyStoreCache`] - in-process, the fallback

pub mod key;
pub mod memory;
pub mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use nutrifolio_core::StoreId;

use crate::config::ApiConfig;

pub use self::key::NearbyStoreKey;
pub use self::memory::MokaNearbyStoreCache;
pub use self::redis_store::RedisNearbyStoreCache;

/// Errors from a cache backend.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// An entry exists but cannot be decoded.
    #[error("corrupt cache entry: {0}")]
    Corrupt(String),
}

/// Outcome of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// Cached, non-empty store id list.
    Hit(Vec<StoreId>),
    /// Cached result of a query that found no stores.
    EmptyHit,
    Miss,
}

impl CacheLookup {
    /// Store ids for a hit, `None` for a miss.
    #[must_use]
    pub fn into_store_ids(self) -> Option<Vec<StoreId>> {
        match self {
            Self::Hit(ids) => Some(ids),
            Self::EmptyHit => Some(Vec::new()),
            Self::Miss => None,
        }
    }
}

/// Storage for nearby-store query results.
#[async_trait]
pub trait NearbyStoreCache: Send + Sync {
    async fn lookup(&self, key: &NearbyStoreKey) -> Result<CacheLookup, CacheError>;

    /// Record the result for `key`. An empty slice is stored as an empty hit.
    async fn store(&self, key: &NearbyStoreKey, store_ids: &[StoreId]) -> Result<(), CacheError>;
}

/// Build the configured cache backend.
///
/// Falls back to the in-process cache when Redis is not configured or the
/// initial connection fails.
pub async fn from_config(config: &ApiConfig) -> Arc<dyn NearbyStoreCache> {
    if let Some(url) = &config.redis_url {
        match RedisNearbyStoreCache::connect(url, config.nearby_cache_ttl).await {
            Ok(cache) => {
                tracing::info!(
                    ttl_secs = config.nearby_cache_ttl.as_secs(),
                    "Nearby-store cache: redis"
                );
                return Arc::new(cache);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to connect to Redis, using in-process cache");
            }
        }
    }

    tracing::info!(
        ttl_secs = config.nearby_cache_ttl.as_secs(),
        capacity = config.nearby_cache_capacity,
        "Nearby-store cache: in-process"
    );
    Arc::new(MokaNearbyStoreCache::new(
        config.nearby_cache_capacity,
        config.nearby_cache_ttl,
    ))
}
