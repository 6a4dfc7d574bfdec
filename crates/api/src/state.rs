//! Application state shared across handlers.

use std::sync::Arc;

use crate::cache::NearbyStoreCache;
use crate::catalog::Catalog;
use crate::config::ApiConfig;
use crate::reference::ReferenceData;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Collaborators sit behind trait objects so
/// tests can swap in in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    catalog: Arc<dyn Catalog>,
    nearby_cache: Arc<dyn NearbyStoreCache>,
    reference: ReferenceData,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `catalog` - Store and product reads
    /// * `nearby_cache` - Nearby-store cache backend
    /// * `reference` - Tags and menu categories loaded at start-up
    #[must_use]
    pub fn new(
        config: ApiConfig,
        catalog: Arc<dyn Catalog>,
        nearby_cache: Arc<dyn NearbyStoreCache>,
        reference: ReferenceData,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                nearby_cache,
                reference,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn Catalog {
        self.inner.catalog.as_ref()
    }

    #[must_use]
    pub fn nearby_cache(&self) -> &dyn NearbyStoreCache {
        self.inner.nearby_cache.as_ref()
    }

    #[must_use]
    pub fn reference(&self) -> &ReferenceData {
        &self.inner.reference
    }
}
