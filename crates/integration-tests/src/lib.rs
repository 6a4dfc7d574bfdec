//! Integration test support for Nutrifolio.
//!
//! # Running Tests
//!
//! ```bash
//! # In-memory suites
//! cargo test -p nutrifolio-integration-tests
//!
//! # Postgres-backed suites (PostGIS required)
//! NUTRIFOLIO_TEST_DATABASE_URL=postgres://... \
//!     cargo test -p nutrifolio-integration-tests -- --ignored
//! ```
//!
//! [`TestApp`] builds the real axum router over an [`InMemoryCatalog`] and a
//! moka nearby-store cache, so requests exercise validation, the discovery
//! pipeline and error mapping without a database.
//!
//! The fixture mirrors a small Athens marketplace. Searching from
//! `(38.0, 23.8)`:
//!
//! | Store | Location | Distance |
//! |-------|----------|----------|
//! | 1 `test_store_1` | (38.0093, 23.8264) | ~2.5 km |
//! | 2 `test_store_2` | (38.0073, 23.7993) | ~0.8 km |
//!
//! | Product | Store | Price | Views | Public | Tags | Categories |
//! |---------|-------|-------|-------|--------|------|------------|
//! | 1 `test_product_a` | 1 | 1.29 | 3 | yes | 1, 2, 4 | 1, 2 |
//! | 2 `test_product_b` | 1 | 5.49 | 6 | yes | 1, 3 | 1 |
//! | 3 `test_product_c` | 2 | 2.89 | 9 | yes | 1, 2, 5 | 1 |
//! | 4 `test_product_d` | 2 | 2.49 | 2 | no | 1, 2, 3 | 1, 2 |

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use secrecy::SecretString;
use tower::ServiceExt;

use nutrifolio_api::cache::{
    CacheError, CacheLookup, MokaNearbyStoreCache, NearbyStoreCache, NearbyStoreKey,
};
use nutrifolio_api::catalog::{Catalog, ProductFilter};
use nutrifolio_api::config::ApiConfig;
use nutrifolio_api::db::RepositoryError;
use nutrifolio_api::models::{Product, ProductDetails, StoreFilterView, StoreSummary};
use nutrifolio_api::reference::ReferenceData;
use nutrifolio_api::routes;
use nutrifolio_api::state::AppState;
use nutrifolio_core::{
    GeoPoint, MaxDistance, MenuCategory, MenuCategoryId, ProductId, StoreId, Tag, TagId,
};

// =============================================================================
// Fixture records
// =============================================================================

/// A store with its location.
#[derive(Debug, Clone)]
pub struct StoreRecord {
    pub summary: StoreSummary,
    pub location: GeoPoint,
}

/// A product with its relations.
#[derive(Debug, Clone)]
pub struct ProductRecord {
    pub product: Product,
    pub tag_ids: Vec<TagId>,
    pub menu_category_ids: Vec<MenuCategoryId>,
    pub details: Option<ProductDetails>,
}

/// The tags seeded by migration.
#[must_use]
pub fn seeded_tags() -> Vec<Tag> {
    [
        "Vegan",
        "Vegetarian",
        "Pescatarian",
        "High Protein",
        "Low Fat",
        "Sugar Free",
        "Gluten Free",
        "Lactose Free",
    ]
    .into_iter()
    .zip(1..)
    .map(|(label, id)| Tag::new(TagId::new(id), label))
    .collect()
}

/// The menu categories seeded by migration.
#[must_use]
pub fn seeded_menu_categories() -> Vec<MenuCategory> {
    vec![
        MenuCategory::new(MenuCategoryId::new(1), "Sandwiches"),
        MenuCategory::new(MenuCategoryId::new(2), "Salads"),
    ]
}

fn store(id: i32, lat: f64, lng: f64) -> StoreRecord {
    StoreRecord {
        summary: StoreSummary {
            id: StoreId::new(id),
            name: format!("test_store_{id}"),
            logo_url: None,
            address: "test_address".to_string(),
            lat,
            lng,
        },
        location: GeoPoint::new(lat, lng).unwrap_or_else(|e| panic!("bad fixture: {e}")),
    }
}

/// Build a product record.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn product(
    id: i32,
    name: &str,
    store_id: i32,
    price_cents: i64,
    view_count: i32,
    is_public: bool,
    tag_ids: &[i32],
    menu_category_ids: &[i32],
) -> ProductRecord {
    ProductRecord {
        product: Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: Some(format!("test description {id}")),
            image_url: None,
            price: Decimal::new(price_cents, 2),
            view_count,
            has_details: false,
            is_public,
            store_id: StoreId::new(store_id),
        },
        tag_ids: tag_ids.iter().copied().map(TagId::new).collect(),
        menu_category_ids: menu_category_ids
            .iter()
            .copied()
            .map(MenuCategoryId::new)
            .collect(),
        details: None,
    }
}

// =============================================================================
// In-memory catalog
// =============================================================================

/// A [`Catalog`] over in-memory fixtures.
///
/// Distances use the haversine formula. Every call is counted, and
/// [`Self::fail_queries`] makes every call return a database error.
pub struct InMemoryCatalog {
    stores: Vec<StoreRecord>,
    products: Mutex<BTreeMap<ProductId, ProductRecord>>,
    tags: Vec<Tag>,
    menu_categories: Vec<MenuCategory>,
    nearby_queries: AtomicUsize,
    filter_queries: AtomicUsize,
    failing: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new(stores: Vec<StoreRecord>, products: Vec<ProductRecord>) -> Self {
        Self {
            stores,
            products: Mutex::new(
                products
                    .into_iter()
                    .map(|record| (record.product.id, record))
                    .collect(),
            ),
            tags: seeded_tags(),
            menu_categories: seeded_menu_categories(),
            nearby_queries: AtomicUsize::new(0),
            filter_queries: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            latency: Mutex::new(None),
        }
    }

    /// Two stores, four products.
    #[must_use]
    pub fn fixture() -> Self {
        Self::new(
            vec![store(1, 38.0093, 23.8264), store(2, 38.0073, 23.7993)],
            vec![
                product(1, "test_product_a", 1, 129, 3, true, &[1, 2, 4], &[1, 2]),
                product(2, "test_product_b", 1, 549, 6, true, &[1, 3], &[1]),
                product(3, "test_product_c", 2, 289, 9, true, &[1, 2, 5], &[1]),
                product(4, "test_product_d", 2, 249, 2, false, &[1, 2, 3], &[1, 2]),
            ],
        )
    }

    /// Add or replace a product.
    pub fn insert_product(&self, record: ProductRecord) {
        self.lock_products().insert(record.product.id, record);
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn fail_queries(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every product filter call.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap_or_else(PoisonError::into_inner) = Some(latency);
    }

    /// Number of geospatial queries served.
    #[must_use]
    pub fn nearby_queries(&self) -> usize {
        self.nearby_queries.load(Ordering::SeqCst)
    }

    /// Number of product filter queries served.
    #[must_use]
    pub fn filter_queries(&self) -> usize {
        self.filter_queries.load(Ordering::SeqCst)
    }

    /// Current view count of a product.
    #[must_use]
    pub fn view_count(&self, id: i32) -> Option<i32> {
        self.lock_products()
            .get(&ProductId::new(id))
            .map(|record| record.product.view_count)
    }

    fn lock_products(&self) -> std::sync::MutexGuard<'_, BTreeMap<ProductId, ProductRecord>> {
        self.products.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    fn store(&self, id: StoreId) -> Option<&StoreRecord> {
        self.stores.iter().find(|s| s.summary.id == id)
    }

    fn product_record(&self, id: ProductId) -> Option<ProductRecord> {
        self.lock_products().get(&id).cloned()
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn nearby_store_ids(
        &self,
        origin: GeoPoint,
        radius: MaxDistance,
    ) -> Result<Vec<StoreId>, RepositoryError> {
        self.check()?;
        self.nearby_queries.fetch_add(1, Ordering::SeqCst);

        let mut ids: Vec<StoreId> = self
            .stores
            .iter()
            .filter(|s| origin.haversine_km(&s.location) <= f64::from(radius.km()))
            .map(|s| s.summary.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn filter_products(
        &self,
        filter: &ProductFilter,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.check()?;
        self.filter_queries.fetch_add(1, Ordering::SeqCst);

        let latency = *self.latency.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        Ok(self
            .lock_products()
            .values()
            .filter(|r| filter.accepts(&r.product, &r.tag_ids, &r.menu_category_ids))
            .map(|r| r.product.clone())
            .collect())
    }

    async fn store_filter_view(
        &self,
        store_id: StoreId,
        origin: GeoPoint,
    ) -> Result<Option<StoreFilterView>, RepositoryError> {
        self.check()?;
        Ok(self.store(store_id).map(|s| StoreFilterView {
            id: s.summary.id,
            name: s.summary.name.clone(),
            logo_url: s.summary.logo_url.clone(),
            distance_km: origin.haversine_km(&s.location),
        }))
    }

    async fn store_summary(
        &self,
        store_id: StoreId,
    ) -> Result<Option<StoreSummary>, RepositoryError> {
        self.check()?;
        Ok(self.store(store_id).map(|s| s.summary.clone()))
    }

    async fn tags_for_product(&self, product_id: ProductId) -> Result<Vec<Tag>, RepositoryError> {
        self.check()?;
        let Some(record) = self.product_record(product_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .tags
            .iter()
            .filter(|t| record.tag_ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn menu_categories_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<MenuCategory>, RepositoryError> {
        self.check()?;
        let Some(record) = self.product_record(product_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .menu_categories
            .iter()
            .filter(|c| record.menu_category_ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn product_by_id(
        &self,
        product_id: ProductId,
    ) -> Result<Option<Product>, RepositoryError> {
        self.check()?;
        Ok(self.product_record(product_id).map(|r| r.product))
    }

    async fn product_details(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductDetails>, RepositoryError> {
        self.check()?;
        Ok(self.product_record(product_id).and_then(|r| r.details))
    }

    async fn increment_view_count(
        &self,
        product_id: ProductId,
    ) -> Result<Option<i32>, RepositoryError> {
        self.check()?;
        Ok(self.lock_products().get_mut(&product_id).map(|r| {
            r.product.view_count += 1;
            r.product.view_count
        }))
    }

    async fn all_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        self.check()?;
        Ok(self.tags.clone())
    }

    async fn all_menu_categories(&self) -> Result<Vec<MenuCategory>, RepositoryError> {
        self.check()?;
        Ok(self.menu_categories.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check()
    }
}

// =============================================================================
// Failing caches
// =============================================================================

fn connection_refused() -> CacheError {
    CacheError::Redis(redis::RedisError::from((
        redis::ErrorKind::IoError,
        "connection refused",
    )))
}

/// A nearby-store cache whose backend is unreachable.
#[derive(Debug, Default)]
pub struct FailingCache {
    lookups: AtomicUsize,
    stores: AtomicUsize,
}

impl FailingCache {
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stores(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NearbyStoreCache for FailingCache {
    async fn lookup(&self, _key: &NearbyStoreKey) -> Result<CacheLookup, CacheError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(connection_refused())
    }

    async fn store(&self, _key: &NearbyStoreKey, _store_ids: &[StoreId]) -> Result<(), CacheError> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        Err(connection_refused())
    }
}

/// A nearby-store cache holding an undecodable entry until it is overwritten.
#[derive(Debug, Default)]
pub struct CorruptEntryCache {
    entry: Mutex<Option<Vec<StoreId>>>,
    lookups: AtomicUsize,
    stores: AtomicUsize,
}

impl CorruptEntryCache {
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn stores(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NearbyStoreCache for CorruptEntryCache {
    async fn lookup(&self, _key: &NearbyStoreKey) -> Result<CacheLookup, CacheError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        let entry = self.entry.lock().unwrap_or_else(PoisonError::into_inner);
        match entry.as_ref() {
            Some(ids) if ids.is_empty() => Ok(CacheLookup::EmptyHit),
            Some(ids) => Ok(CacheLookup::Hit(ids.clone())),
            None => Err(CacheError::Corrupt("invalid store id list".to_string())),
        }
    }

    async fn store(&self, _key: &NearbyStoreKey, store_ids: &[StoreId]) -> Result<(), CacheError> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        *self.entry.lock().unwrap_or_else(PoisonError::into_inner) = Some(store_ids.to_vec());
        Ok(())
    }
}

// =============================================================================
// Test application
// =============================================================================

/// Configuration suitable for in-memory tests.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://localhost/nutrifolio_test"),
        host: [127, 0, 0, 1].into(),
        port: 0,
        redis_url: None,
        nearby_cache_ttl: Duration::from_secs(300),
        nearby_cache_capacity: 1_000,
        discovery_timeout: Duration::from_secs(5),
        db_max_connections: 2,
        run_migrations: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("response body is not JSON ({e}): {:?}", self.text()))
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// The API router over in-memory collaborators.
pub struct TestApp {
    pub catalog: Arc<InMemoryCatalog>,
    router: Router,
}

impl TestApp {
    /// Fixture catalog with an in-process cache.
    #[must_use]
    pub fn new() -> Self {
        Self::with_catalog(InMemoryCatalog::fixture())
    }

    #[must_use]
    pub fn with_catalog(catalog: InMemoryCatalog) -> Self {
        let config = test_config();
        let cache = Arc::new(MokaNearbyStoreCache::new(
            config.nearby_cache_capacity,
            config.nearby_cache_ttl,
        ));
        Self::build(config, Arc::new(catalog), cache)
    }

    /// Assemble the router from explicit collaborators.
    #[must_use]
    pub fn build(
        config: ApiConfig,
        catalog: Arc<InMemoryCatalog>,
        cache: Arc<dyn NearbyStoreCache>,
    ) -> Self {
        let reference = ReferenceData::new(seeded_tags(), seeded_menu_categories());
        let state = AppState::new(config, catalog.clone(), cache, reference);
        Self {
            catalog,
            router: routes::app(state),
        }
    }

    /// Issue a GET request.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn get(&self, uri: &str) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap_or_else(|e| panic!("bad request {uri}: {e}")),
            )
            .await
            .unwrap_or_else(|e| match e {});

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .unwrap_or_else(|e| panic!("failed to read body: {e}"))
            .to_bytes()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Discovery request from `(38.0, 23.8)` with prices `0..=max_price`.
///
/// `extra` is appended verbatim and should start with `&`.
#[must_use]
pub fn discovery_uri(max_dist: u8, max_price: &str, extra: &str) -> String {
    format!(
        "/products/?lat=38&lng=23.8&max_dist={max_dist}&min_price=0&max_price={max_price}{extra}"
    )
}

/// Product names per bucket, in response order.
///
/// # Panics
///
/// Panics if the body does not have the discovery response shape.
#[must_use]
pub fn bucket_names(body: &serde_json::Value) -> Vec<(i64, Vec<String>)> {
    body["products_by_menu_categories"]
        .as_array()
        .unwrap_or_else(|| panic!("missing products_by_menu_categories: {body}"))
        .iter()
        .map(|bucket| {
            let category = bucket["menu_category"]["id"].as_i64().unwrap_or_default();
            let names = bucket["products"]
                .as_array()
                .map(|products| {
                    products
                        .iter()
                        .filter_map(|p| p["name"].as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default();
            (category, names)
        })
        .collect()
}
