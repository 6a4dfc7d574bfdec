//! Product domain types.
//!
//! `Product` mirrors a `products` row. The remaining types are the shapes the
//! product routes serialize; prices are rendered as JSON numbers.

use rust_decimal::Decimal;
use serde::Serialize;

use nutrifolio_core::{MenuCategory, ProductId, StoreId, Tag};

use super::store::{StoreFilterView, StoreSummary};

/// A product (domain type).
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Decimal,
    pub view_count: i32,
    pub has_details: bool,
    pub is_public: bool,
    pub store_id: StoreId,
}

/// Nutrition facts attached to a product.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductDetails {
    pub calories: Option<i32>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fiber: Option<f64>,
    pub sugars: Option<f64>,
    pub fat: Option<f64>,
    pub saturated_fat: Option<f64>,
}

/// A filtered product with its store view and relations attached.
#[derive(Debug, Clone)]
pub struct EnrichedProduct {
    pub product: Product,
    pub store: StoreFilterView,
    pub tags: Vec<Tag>,
    /// Every category the product belongs to, not only the requested ones.
    pub menu_categories: Vec<MenuCategory>,
}

impl EnrichedProduct {
    /// Build the listing shown inside a category bucket.
    #[must_use]
    pub fn listing(&self) -> ProductListing {
        ProductListing {
            id: self.product.id,
            name: self.product.name.clone(),
            description: self.product.description.clone(),
            image_url: self.product.image_url.clone(),
            price: self.product.price,
            store: self.store.clone(),
            tags: self.tags.clone(),
            view_count: self.product.view_count,
        }
    }
}

/// A discovered product as it appears in a menu-category bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductListing {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub store: StoreFilterView,
    pub tags: Vec<Tag>,
    /// Sort key only; not part of the listing body.
    #[serde(skip)]
    pub view_count: i32,
}

/// Full product view returned by the single-product lookup.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetailed {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub is_public: bool,
    pub store_id: StoreId,
    pub view_count: i32,
    pub store: StoreSummary,
    pub details: Option<ProductDetails>,
    pub tags: Vec<Tag>,
    pub menu_categories: Vec<MenuCategory>,
}
