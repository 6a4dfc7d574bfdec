//! Deterministic nearby-store cache keys.

use core::fmt;
use core::hash::{Hash, Hasher};

use sha2::{Digest, Sha256};

use nutrifolio_core::{GeoPoint, MaxDistance};

/// Coordinates are quantized to this many steps per degree (~0.11 m).
const STEPS_PER_DEGREE: f64 = 1_000_000.0;

/// Leading SHA-256 digest bytes kept in the Redis key.
const HASH_PREFIX_BYTES: usize = 8;

/// Fingerprint of a nearby-store query.
///
/// Latitude and longitude are rounded to micro-degrees. [`Self::origin`]
/// returns the rounded point, which is the point the geospatial query must
/// use so a cached value is exactly what a fresh query would return.
#[derive(Debug, Clone, Copy)]
pub struct NearbyStoreKey {
    lat_steps: i64,
    lng_steps: i64,
    radius: MaxDistance,
    origin: GeoPoint,
}

impl NearbyStoreKey {
    #[must_use]
    pub fn new(origin: GeoPoint, radius: MaxDistance) -> Self {
        let lat_steps = quantize(origin.lat());
        let lng_steps = quantize(origin.lng());
        #[allow(clippy::cast_precision_loss)] // |steps| <= 1.8e8, exact in f64
        let rounded = GeoPoint::new(
            lat_steps as f64 / STEPS_PER_DEGREE,
            lng_steps as f64 / STEPS_PER_DEGREE,
        )
        .unwrap_or(origin);

        Self {
            lat_steps,
            lng_steps,
            radius,
            origin: rounded,
        }
    }

    /// The quantized search point.
    #[must_use]
    pub const fn origin(&self) -> GeoPoint {
        self.origin
    }

    #[must_use]
    pub const fn radius(&self) -> MaxDistance {
        self.radius
    }

    /// Redis key: `prefix` followed by a truncated SHA-256 of the fingerprint.
    #[must_use]
    pub fn redis_key(&self, prefix: &str) -> String {
        let digest = Sha256::digest(self.to_string().as_bytes());
        let short: Vec<u8> = digest.iter().copied().take(HASH_PREFIX_BYTES).collect();
        format!("{prefix}{}", hex::encode(short))
    }
}

#[allow(clippy::cast_possible_truncation)] // coordinates are range-checked by GeoPoint
fn quantize(degrees: f64) -> i64 {
    (degrees * STEPS_PER_DEGREE).round() as i64
}

impl PartialEq for NearbyStoreKey {
    fn eq(&self, other: &Self) -> bool {
        self.lat_steps == other.lat_steps
            && self.lng_steps == other.lng_steps
            && self.radius == other.radius
    }
}

impl Eq for NearbyStoreKey {}

impl Hash for NearbyStoreKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lat_steps.hash(state);
        self.lng_steps.hash(state);
        self.radius.hash(state);
    }
}

impl fmt::Display for NearbyStoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.lat_steps, self.lng_steps, self.radius.km())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn test_nearby_points_share_a_key() {
        let a = NearbyStoreKey::new(point(38.000_000_1, 23.8), MaxDistance::FiveKm);
        let b = NearbyStoreKey::new(point(38.000_000_4, 23.8), MaxDistance::FiveKm);
        assert_eq!(a, b);
        assert_eq!(a.redis_key("nf:"), b.redis_key("nf:"));
    }

    #[test]
    fn test_radius_and_position_separate_keys() {
        let origin = point(38.0, 23.8);
        let five = NearbyStoreKey::new(origin, MaxDistance::FiveKm);
        let one = NearbyStoreKey::new(origin, MaxDistance::OneKm);
        let moved = NearbyStoreKey::new(point(38.000_01, 23.8), MaxDistance::FiveKm);

        assert_ne!(five, one);
        assert_ne!(five.redis_key("nf:"), one.redis_key("nf:"));
        assert_ne!(five, moved);
    }

    #[test]
    fn test_origin_is_quantized() {
        let key = NearbyStoreKey::new(point(38.000_000_4, -23.800_000_6), MaxDistance::OneKm);
        assert!((key.origin().lat() - 38.0).abs() < 1e-12);
        assert!((key.origin().lng() - -23.800_001).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_coordinates_stay_valid() {
        let key = NearbyStoreKey::new(point(-90.0, 180.0), MaxDistance::ThreeKm);
        assert!((key.origin().lat() - -90.0).abs() < f64::EPSILON);
        assert!((key.origin().lng() - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_redis_key_shape() {
        let key = NearbyStoreKey::new(point(38.0, 23.8), MaxDistance::FiveKm);
        let redis_key = key.redis_key("nutrifolio:nearby:");

        assert!(redis_key.starts_with("nutrifolio:nearby:"));
        let hash = redis_key.trim_start_matches("nutrifolio:nearby:");
        assert_eq!(hash.len(), HASH_PREFIX_BYTES * 2);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_display() {
        let key = NearbyStoreKey::new(point(38.0, 23.8), MaxDistance::ThreeKm);
        assert_eq!(key.to_string(), "38000000:23800000:3");
    }
}
