//! Sort options for discovery results.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An option string that does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}', expected one of: {expected}")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Field to sort products by within each menu-category bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortBy {
    #[serde(rename = "price")]
    Price,
    #[serde(rename = "distance_km")]
    DistanceKm,
    /// Popularity.
    #[serde(rename = "view_count")]
    ViewCount,
}

impl SortBy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::DistanceKm => "distance_km",
            Self::ViewCount => "view_count",
        }
    }
}

impl FromStr for SortBy {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(Self::Price),
            "distance_km" => Ok(Self::DistanceKm),
            "view_count" => Ok(Self::ViewCount),
            _ => Err(UnknownOption {
                kind: "sort_by",
                value: s.to_owned(),
                expected: "price, distance_km, view_count",
            }),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction. The wire form is upper-case (`ASC` / `DESC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Apply this direction to an ascending comparison result.
    #[must_use]
    pub const fn apply(self, ordering: core::cmp::Ordering) -> core::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            _ => Err(UnknownOption {
                kind: "sort_order",
                value: s.to_owned(),
                expected: "ASC, DESC",
            }),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::cmp::Ordering;

    use super::*;

    #[test]
    fn test_sort_by_parse() {
        assert_eq!("price".parse::<SortBy>().unwrap(), SortBy::Price);
        assert_eq!("distance_km".parse::<SortBy>().unwrap(), SortBy::DistanceKm);
        assert_eq!("view_count".parse::<SortBy>().unwrap(), SortBy::ViewCount);
        let err = "popularity".parse::<SortBy>().unwrap_err();
        assert_eq!(err.kind, "sort_by");
        assert_eq!(err.value, "popularity");
    }

    #[test]
    fn test_sort_order_is_case_sensitive() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("asc".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_sort_order_apply() {
        assert_eq!(SortOrder::Asc.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortOrder::Desc.apply(Ordering::Less), Ordering::Greater);
        assert_eq!(SortOrder::Desc.apply(Ordering::Equal), Ordering::Equal);
    }

    #[test]
    fn test_display_matches_wire_form() {
        assert_eq!(SortBy::DistanceKm.to_string(), "distance_km");
        assert_eq!(SortOrder::Desc.to_string(), "DESC");
        assert_eq!(serde_json::to_string(&SortOrder::Desc).unwrap(), "\"DESC\"");
    }
}
