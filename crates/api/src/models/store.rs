//! Store domain types.

use serde::Serialize;

use nutrifolio_core::StoreId;

/// A store as shown next to a discovered product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreFilterView {
    pub id: StoreId,
    pub name: String,
    pub logo_url: Option<String>,
    /// Geodesic distance from the search point, in kilometres.
    pub distance_km: f64,
}

/// A store as shown on the single-product page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreSummary {
    pub id: StoreId,
    pub name: String,
    pub logo_url: Option<String>,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}
