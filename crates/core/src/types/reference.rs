//! Reference entities: the fixed, seeded tag and menu-category sets.
//!
//! Both serialize their description under the `desc` key, which is the
//! public JSON contract for these entities.

use serde::{Deserialize, Serialize};

use super::id::{MenuCategoryId, TagId};

/// A dietary or attribute label (e.g. "Vegan"), used as an AND-filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub label: String,
    #[serde(rename = "desc")]
    pub description: Option<String>,
}

impl Tag {
    #[must_use]
    pub fn new(id: TagId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            description: None,
        }
    }
}

/// A classification bucket (e.g. "Salads"), used as an OR-filter and as the
/// grouping key of discovery results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuCategory {
    pub id: MenuCategoryId,
    pub label: String,
    #[serde(rename = "desc")]
    pub description: Option<String>,
}

impl MenuCategory {
    #[must_use]
    pub fn new(id: MenuCategoryId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            description: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_description_serializes_as_desc() {
        let tag = Tag {
            id: TagId::new(4),
            label: "High Protein".to_owned(),
            description: Some("At least 30% of the calories are protein.".to_owned()),
        };
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["id"], 4);
        assert_eq!(json["label"], "High Protein");
        assert_eq!(json["desc"], "At least 30% of the calories are protein.");
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_menu_category_null_desc() {
        let category = MenuCategory::new(MenuCategoryId::new(1), "Sandwiches");
        let json = serde_json::to_string(&category).unwrap();
        assert_eq!(json, r#"{"id":1,"label":"Sandwiches","desc":null}"#);
    }
}
