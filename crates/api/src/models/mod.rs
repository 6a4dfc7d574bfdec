//! Domain models for the API.
//!
//! Row-level domain types (`Product`, store views) plus the JSON shapes
//! returned by the product routes.

pub mod product;
pub mod store;

pub use product::{EnrichedProduct, Product, ProductDetailed, ProductDetails, ProductListing};
pub use store::{StoreFilterView, StoreSummary};
