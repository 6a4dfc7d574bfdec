//! Grouping by menu category and per-bucket ordering.

use std::collections::BTreeMap;

use serde::Serialize;

use nutrifolio_core::{MenuCategory, MenuCategoryId, SortBy, SortOrder};

use super::fan_out::CategorizedListing;
use crate::models::ProductListing;

/// All discovered products for one menu category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBucket {
    pub menu_category: MenuCategory,
    pub products: Vec<ProductListing>,
}

/// Partition rows by category and sort each bucket.
///
/// Buckets come out ascending by category id; only categories with at least
/// one row produce a bucket. Within a bucket the sort is stable, so listings
/// with equal keys keep their incoming order under either direction.
#[must_use]
pub fn group_and_sort(
    rows: Vec<CategorizedListing>,
    sort_by: SortBy,
    sort_order: SortOrder,
) -> Vec<CategoryBucket> {
    let mut buckets: BTreeMap<MenuCategoryId, CategoryBucket> = BTreeMap::new();

    for row in rows {
        buckets
            .entry(row.menu_category.id)
            .or_insert_with(|| CategoryBucket {
                menu_category: row.menu_category,
                products: Vec::new(),
            })
            .products
            .push(row.listing);
    }

    buckets
        .into_values()
        .map(|mut bucket| {
            bucket
                .products
                .sort_by(|a, b| sort_order.apply(compare(sort_by, a, b)));
            bucket
        })
        .collect()
}

fn compare(sort_by: SortBy, a: &ProductListing, b: &ProductListing) -> core::cmp::Ordering {
    match sort_by {
        SortBy::Price => a.price.cmp(&b.price),
        SortBy::DistanceKm => a.store.distance_km.total_cmp(&b.store.distance_km),
        SortBy::ViewCount => a.view_count.cmp(&b.view_count),
    }
}
