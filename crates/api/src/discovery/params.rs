//! Query-string validation for the discovery endpoint.
//!
//! `tag_ids` and `menu_category_ids` are repeated keys
//! (`tag_ids=1&tag_ids=4`), so the raw query string is parsed with
//! `form_urlencoded` rather than a flat struct. Every problem is collected
//! before returning, one [`FieldError`] per field.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use rust_decimal::Decimal;

use nutrifolio_core::{
    GeoError, GeoPoint, MaxDistance, MenuCategoryId, SortBy, SortOrder, TagId,
};

use crate::error::FieldError;
use crate::reference::ReferenceData;

/// A validated discovery request.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryQuery {
    pub origin: GeoPoint,
    pub max_dist: MaxDistance,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Distinct, ascending. May be empty.
    pub tag_ids: Vec<TagId>,
    /// Distinct, ascending. Never empty.
    pub menu_category_ids: Vec<MenuCategoryId>,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl DiscoveryQuery {
    /// Parse and validate a raw query string.
    ///
    /// Scalar parameters given more than once take their last value.
    ///
    /// # Errors
    ///
    /// Returns every rejected field when any parameter is missing, malformed,
    /// out of range or names an unknown tag or menu category.
    pub fn parse(raw: &str, reference: &ReferenceData) -> Result<Self, Vec<FieldError>> {
        let params = QueryParams::parse(raw);
        let mut errors = Vec::new();

        let lat = params.required(&mut errors, "lat", parse_f64);
        let lng = params.required(&mut errors, "lng", parse_f64);
        let origin = match (lat, lng) {
            (Some(lat), Some(lng)) => GeoPoint::new(lat, lng)
                .map_err(|e| {
                    let field = match e {
                        GeoError::LongitudeOutOfRange(_) => "lng",
                        _ => "lat",
                    };
                    errors.push(FieldError::new(field, e.to_string()));
                })
                .ok(),
            _ => None,
        };

        let max_dist = params.required(&mut errors, "max_dist", |s| {
            MaxDistance::from_str(s).map_err(|e| e.to_string())
        });

        let min_price = params
            .required(&mut errors, "min_price", parse_price)
            .and_then(|price| {
                if price < Decimal::ZERO {
                    errors.push(FieldError::new("min_price", "must be greater than or equal to 0"));
                    None
                } else {
                    Some(price)
                }
            });
        let max_price = params
            .required(&mut errors, "max_price", parse_price)
            .and_then(|price| {
                if price <= Decimal::ZERO {
                    errors.push(FieldError::new("max_price", "must be greater than 0"));
                    None
                } else {
                    Some(price)
                }
            });
        if let (Some(min), Some(max)) = (min_price, max_price)
            && min > max
        {
            errors.push(FieldError::new(
                "min_price",
                "must be less than or equal to max_price",
            ));
        }

        let tag_ids = params.id_list(&mut errors, "tag_ids", |id| {
            let id = TagId::new(id);
            reference.tag(id).map(|_| id)
        });
        let menu_category_ids = params.id_list(&mut errors, "menu_category_ids", |id| {
            let id = MenuCategoryId::new(id);
            reference.menu_category(id).map(|_| id)
        });
        if params.values("menu_category_ids").is_empty() {
            errors.push(FieldError::new(
                "menu_category_ids",
                "at least one menu category is required",
            ));
        }

        let sort_by = params.required(&mut errors, "sort_by", |s| {
            SortBy::from_str(s).map_err(|e| e.to_string())
        });
        let sort_order = params.required(&mut errors, "sort_order", |s| {
            SortOrder::from_str(s).map_err(|e| e.to_string())
        });

        match (origin, max_dist, min_price, max_price, sort_by, sort_order) {
            (
                Some(origin),
                Some(max_dist),
                Some(min_price),
                Some(max_price),
                Some(sort_by),
                Some(sort_order),
            ) if errors.is_empty() => Ok(Self {
                origin,
                max_dist,
                min_price,
                max_price,
                tag_ids,
                menu_category_ids,
                sort_by,
                sort_order,
            }),
            _ => Err(errors),
        }
    }
}

/// Decoded query pairs grouped by key, in order of appearance.
struct QueryParams {
    pairs: HashMap<String, Vec<String>>,
}

impl QueryParams {
    fn parse(raw: &str) -> Self {
        let mut pairs: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            pairs.entry(key.into_owned()).or_default().push(value.into_owned());
        }
        Self { pairs }
    }

    fn values(&self, key: &str) -> &[String] {
        self.pairs.get(key).map_or(&[], Vec::as_slice)
    }

    fn required<T>(
        &self,
        errors: &mut Vec<FieldError>,
        key: &str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Option<T> {
        let Some(raw) = self.values(key).last() else {
            errors.push(FieldError::new(key, "field required"));
            return None;
        };
        parse(raw.trim())
            .map_err(|message| errors.push(FieldError::new(key, message)))
            .ok()
    }

    /// Parse every value of a repeated id key, dropping duplicates.
    ///
    /// `known` maps a raw id to its typed form when it exists in the
    /// reference dictionary.
    fn id_list<T: Ord>(
        &self,
        errors: &mut Vec<FieldError>,
        key: &str,
        known: impl Fn(i32) -> Option<T>,
    ) -> Vec<T> {
        let mut ids = BTreeSet::new();
        for raw in self.values(key) {
            match raw.trim().parse::<i32>() {
                Ok(id) => match known(id) {
                    Some(typed) => {
                        ids.insert(typed);
                    }
                    None => errors.push(FieldError::new(key, format!("unknown id {id}"))),
                },
                Err(_) => errors.push(FieldError::new(
                    key,
                    format!("'{raw}' is not a valid integer"),
                )),
            }
        }
        ids.into_iter().collect()
    }
}

fn parse_f64(raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| format!("'{raw}' is not a valid number"))
}

fn parse_price(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| format!("'{raw}' is not a valid price"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nutrifolio_core::{MenuCategory, Tag};

    use super::*;

    const VALID: &str = "lat=38&lng=23.8&max_dist=5&min_price=0&max_price=20\
                         &tag_ids=1&menu_category_ids=1&sort_by=price&sort_order=ASC";

    fn reference() -> ReferenceData {
        ReferenceData::new(
            (1..=8).map(|id| Tag::new(TagId::new(id), format!("Tag {id}"))),
            [
                MenuCategory::new(MenuCategoryId::new(1), "Sandwiches"),
                MenuCategory::new(MenuCategoryId::new(2), "Salads"),
            ],
        )
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_query() {
        let query = DiscoveryQuery::parse(VALID, &reference()).unwrap();

        assert!((query.origin.lat() - 38.0).abs() < f64::EPSILON);
        assert_eq!(query.max_dist, MaxDistance::FiveKm);
        assert_eq!(query.min_price, Decimal::ZERO);
        assert_eq!(query.max_price, Decimal::new(20, 0));
        assert_eq!(query.tag_ids, vec![TagId::new(1)]);
        assert_eq!(query.menu_category_ids, vec![MenuCategoryId::new(1)]);
        assert_eq!(query.sort_by, SortBy::Price);
        assert_eq!(query.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_repeated_ids_are_collapsed_and_sorted() {
        let raw = format!("{VALID}&tag_ids=4&tag_ids=1&menu_category_ids=2&menu_category_ids=1");
        let query = DiscoveryQuery::parse(&raw, &reference()).unwrap();

        assert_eq!(query.tag_ids, vec![TagId::new(1), TagId::new(4)]);
        assert_eq!(
            query.menu_category_ids,
            vec![MenuCategoryId::new(1), MenuCategoryId::new(2)]
        );
    }

    #[test]
    fn test_tag_ids_are_optional() {
        let raw = VALID.replace("&tag_ids=1", "");
        let query = DiscoveryQuery::parse(&raw, &reference()).unwrap();
        assert!(query.tag_ids.is_empty());
    }

    #[test]
    fn test_menu_category_ids_are_required() {
        let raw = VALID.replace("&menu_category_ids=1", "");
        let errors = DiscoveryQuery::parse(&raw, &reference()).unwrap_err();
        assert_eq!(fields(&errors), vec!["menu_category_ids"]);
    }

    #[test]
    fn test_unknown_reference_ids() {
        let raw = format!("{VALID}&tag_ids=99&menu_category_ids=7");
        let errors = DiscoveryQuery::parse(&raw, &reference()).unwrap_err();
        assert_eq!(fields(&errors), vec!["tag_ids", "menu_category_ids"]);
        assert_eq!(errors[0].message, "unknown id 99");
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let raw = VALID.replace("lat=38", "lat=91");
        let errors = DiscoveryQuery::parse(&raw, &reference()).unwrap_err();
        assert_eq!(fields(&errors), vec!["lat"]);

        let raw = VALID.replace("lng=23.8", "lng=-180.5");
        let errors = DiscoveryQuery::parse(&raw, &reference()).unwrap_err();
        assert_eq!(fields(&errors), vec!["lng"]);
    }

    #[test]
    fn test_non_finite_coordinates() {
        let raw = VALID.replace("lat=38", "lat=NaN");
        let errors = DiscoveryQuery::parse(&raw, &reference()).unwrap_err();
        assert_eq!(fields(&errors), vec!["lat"]);
    }

    #[test]
    fn test_unsupported_distance() {
        let raw = VALID.replace("max_dist=5", "max_dist=2");
        let errors = DiscoveryQuery::parse(&raw, &reference()).unwrap_err();
        assert_eq!(fields(&errors), vec!["max_dist"]);
    }

    #[test]
    fn test_price_bounds() {
        let negative_min = VALID.replace("min_price=0", "min_price=-1");
        let errors = DiscoveryQuery::parse(&negative_min, &reference()).unwrap_err();
        assert_eq!(fields(&errors), vec!["min_price"]);

        let zero_max = VALID.replace("max_price=20", "max_price=0");
        let errors = DiscoveryQuery::parse(&zero_max, &reference()).unwrap_err();
        assert_eq!(fields(&errors), vec!["max_price"]);

        let inverted = VALID.replace("min_price=0", "min_price=25");
        let errors = DiscoveryQuery::parse(&inverted, &reference()).unwrap_err();
        assert_eq!(fields(&errors), vec!["min_price"]);
    }

    #[test]
    fn test_decimal_prices_are_exact() {
        let raw = VALID.replace("max_price=20", "max_price=4.29");
        let query = DiscoveryQuery::parse(&raw, &reference()).unwrap();
        assert_eq!(query.max_price, Decimal::new(429, 2));
    }

    #[test]
    fn test_sort_options_are_validated() {
        let raw = VALID
            .replace("sort_by=price", "sort_by=rating")
            .replace("sort_order=ASC", "sort_order=up");
        let errors = DiscoveryQuery::parse(&raw, &reference()).unwrap_err();
        assert_eq!(fields(&errors), vec!["sort_by", "sort_order"]);
    }

    #[test]
    fn test_everything_missing_reports_every_field() {
        let errors = DiscoveryQuery::parse("", &reference()).unwrap_err();
        assert_eq!(
            fields(&errors),
            vec![
                "lat",
                "lng",
                "max_dist",
                "min_price",
                "max_price",
                "menu_category_ids",
                "sort_by",
                "sort_order"
            ]
        );
    }

    #[test]
    fn test_percent_encoded_values() {
        let raw = VALID.replace("lng=23.8", "lng=%2023.8");
        let query = DiscoveryQuery::parse(&raw, &reference()).unwrap();
        assert!((query.origin.lng() - 23.8).abs() < f64::EPSILON);
    }
}
