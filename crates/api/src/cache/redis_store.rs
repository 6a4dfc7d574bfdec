//! Redis-backed nearby-store cache.
//!
//! Each entry is a Redis list of decimal store ids. A query that found no
//! stores is stored as a one-element list holding [`EMPTY_MARKER`], since
//! Redis cannot hold an empty list; the marker is not a number, so it can
//! never be mistaken for a store id.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use nutrifolio_core::StoreId;

use super::{CacheError, CacheLookup, NearbyStoreCache, NearbyStoreKey};

const KEY_PREFIX: &str = "nutrifolio:nearby-stores:";
const EMPTY_MARKER: &str = "empty";

/// Nearby-store cache shared through Redis.
#[derive(Clone)]
pub struct RedisNearbyStoreCache {
    connection: ConnectionManager,
    ttl: Duration,
}

impl RedisNearbyStoreCache {
    /// Open a managed connection.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Redis` if the URL is invalid or the server cannot
    /// be reached.
    pub async fn connect(url: &SecretString, ttl: Duration) -> Result<Self, CacheError> {
        let client = redis::Client::open(url.expose_secret())?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection, ttl })
    }

    fn ttl_secs(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

#[async_trait]
impl NearbyStoreCache for RedisNearbyStoreCache {
    async fn lookup(&self, key: &NearbyStoreKey) -> Result<CacheLookup, CacheError> {
        let redis_key = key.redis_key(KEY_PREFIX);
        let mut conn = self.connection.clone();

        let exists: bool = conn.exists(&redis_key).await?;
        if !exists {
            debug!(cache_key = %redis_key, "Nearby-store cache MISS");
            return Ok(CacheLookup::Miss);
        }

        let values: Vec<String> = conn.lrange(&redis_key, 0, -1).await?;
        let lookup = decode_entry(&values)?;
        debug!(cache_key = %redis_key, "Nearby-store cache HIT");
        Ok(lookup)
    }

    async fn store(&self, key: &NearbyStoreKey, store_ids: &[StoreId]) -> Result<(), CacheError> {
        let redis_key = key.redis_key(KEY_PREFIX);
        let mut conn = self.connection.clone();

        // Replace rather than append so concurrent writers cannot interleave
        let () = redis::pipe()
            .atomic()
            .del(&redis_key)
            .ignore()
            .rpush(&redis_key, encode_entry(store_ids))
            .ignore()
            .expire(&redis_key, self.ttl_secs())
            .ignore()
            .query_async(&mut conn)
            .await?;

        debug!(
            cache_key = %redis_key,
            store_count = store_ids.len(),
            ttl_secs = self.ttl.as_secs(),
            "Nearby-store cache SET"
        );
        Ok(())
    }
}

fn encode_entry(store_ids: &[StoreId]) -> Vec<String> {
    if store_ids.is_empty() {
        return vec![EMPTY_MARKER.to_string()];
    }
    store_ids.iter().map(ToString::to_string).collect()
}

fn decode_entry(values: &[String]) -> Result<CacheLookup, CacheError> {
    match values {
        // Expired between EXISTS and LRANGE
        [] => Ok(CacheLookup::Miss),
        [only] if only == EMPTY_MARKER => Ok(CacheLookup::EmptyHit),
        _ => values
            .iter()
            .map(|value| {
                value
                    .parse::<i32>()
                    .map(StoreId::new)
                    .map_err(|_| CacheError::Corrupt(format!("non-numeric store id '{value}'")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(CacheLookup::Hit),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_result_uses_marker() {
        assert_eq!(encode_entry(&[]), strings(&["empty"]));
        assert_eq!(
            decode_entry(&strings(&["empty"])).unwrap(),
            CacheLookup::EmptyHit
        );
    }

    #[test]
    fn test_ids_decode_in_order() {
        let encoded = encode_entry(&[StoreId::new(4), StoreId::new(1)]);
        assert_eq!(encoded, strings(&["4", "1"]));
        assert_eq!(
            decode_entry(&encoded).unwrap(),
            CacheLookup::Hit(vec![StoreId::new(4), StoreId::new(1)])
        );
    }

    #[test]
    fn test_vanished_entry_is_miss() {
        assert_eq!(decode_entry(&[]).unwrap(), CacheLookup::Miss);
    }

    #[test]
    fn test_garbage_is_corrupt() {
        assert!(matches!(
            decode_entry(&strings(&["1", "two"])),
            Err(CacheError::Corrupt(_))
        ));
        // The marker is only meaningful on its own
        assert!(decode_entry(&strings(&["1", "empty"])).is_err());
    }

    #[tokio::test]
    #[ignore = "Requires a Redis server at NUTRIFOLIO_TEST_REDIS_URL"]
    async fn test_round_trip_against_redis() {
        use nutrifolio_core::{GeoPoint, MaxDistance};

        let url = std::env::var("NUTRIFOLIO_TEST_REDIS_URL").unwrap();
        let cache = RedisNearbyStoreCache::connect(&SecretString::from(url), Duration::from_secs(5))
            .await
            .unwrap();
        let key = NearbyStoreKey::new(GeoPoint::new(38.0, 23.8).unwrap(), MaxDistance::OneKm);

        cache.store(&key, &[]).await.unwrap();
        assert_eq!(cache.lookup(&key).await.unwrap(), CacheLookup::EmptyHit);

        cache.store(&key, &[StoreId::new(2)]).await.unwrap();
        assert_eq!(
            cache.lookup(&key).await.unwrap(),
            CacheLookup::Hit(vec![StoreId::new(2)])
        );
    }
}
