//! Geographic primitives for nearby-store discovery.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres (IUGG).
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Errors that can occur when constructing a [`GeoPoint`] or [`MaxDistance`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    /// Latitude is not a finite number in `[-90, 90]`.
    #[error("latitude must be between -90 and 90 (got {0})")]
    LatitudeOutOfRange(f64),
    /// Longitude is not a finite number in `[-180, 180]`.
    #[error("longitude must be between -180 and 180 (got {0})")]
    LongitudeOutOfRange(f64),
    /// The search radius is not one of the supported buckets.
    #[error("max distance must be one of 1, 3 or 5 km (got {0})")]
    UnsupportedDistance(String),
}

/// A WGS-84 coordinate pair.
///
/// ## Constraints
///
/// - `lat` is finite and within `[-90, 90]`
/// - `lng` is finite and within `[-180, 180]`
///
/// ## Examples
///
/// ```
/// use nutrifolio_core::GeoPoint;
///
/// assert!(GeoPoint::new(38.0, 23.8).is_ok());
/// assert!(GeoPoint::new(91.0, 23.8).is_err());
/// assert!(GeoPoint::new(38.0, f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    /// Create a validated point.
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate is non-finite or out of range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::LatitudeOutOfRange(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::LongitudeOutOfRange(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }

    /// Great-circle distance to `other` in kilometres (haversine on a sphere).
    ///
    /// Agrees with `PostGIS` `geography` distances to within a fraction of a
    /// percent, which is well inside the gap between radius buckets.
    #[must_use]
    pub fn haversine_km(&self, other: &Self) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}

/// Supported search radius buckets.
///
/// The radius is a small fixed enumeration rather than an arbitrary float so
/// that the nearby-store cache key space stays bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MaxDistance {
    OneKm,
    ThreeKm,
    FiveKm,
}

impl MaxDistance {
    /// All buckets, smallest first.
    pub const ALL: [Self; 3] = [Self::OneKm, Self::ThreeKm, Self::FiveKm];

    /// Radius in whole kilometres.
    #[must_use]
    pub const fn km(self) -> u8 {
        match self {
            Self::OneKm => 1,
            Self::ThreeKm => 3,
            Self::FiveKm => 5,
        }
    }

    /// Radius in metres, the unit `ST_DWithin` expects for `geography`.
    #[must_use]
    pub fn meters(self) -> f64 {
        f64::from(self.km()) * 1000.0
    }
}

impl TryFrom<u8> for MaxDistance {
    type Error = GeoError;

    fn try_from(km: u8) -> Result<Self, Self::Error> {
        match km {
            1 => Ok(Self::OneKm),
            3 => Ok(Self::ThreeKm),
            5 => Ok(Self::FiveKm),
            other => Err(GeoError::UnsupportedDistance(other.to_string())),
        }
    }
}

impl From<MaxDistance> for u8 {
    fn from(distance: MaxDistance) -> Self {
        distance.km()
    }
}

impl FromStr for MaxDistance {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| GeoError::UnsupportedDistance(s.to_owned()))
            .and_then(Self::try_from)
    }
}

impl fmt::Display for MaxDistance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}km", self.km())
    }
}
