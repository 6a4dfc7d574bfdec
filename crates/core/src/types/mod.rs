//! Core types for Nutrifolio.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod geo;
pub mod id;
pub mod reference;
pub mod sort;

pub use geo::{GeoError, GeoPoint, MaxDistance};
pub use id::*;
pub use reference::{MenuCategory, Tag};
pub use sort::{SortBy, SortOrder, UnknownOption};
