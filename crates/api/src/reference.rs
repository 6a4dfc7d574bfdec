//! Reference dictionary: tags and menu categories.
//!
//! Both sets are seeded by migration and never change at runtime, so they are
//! loaded once at start-up and shared read-only. Request validation checks
//! requested ids against this dictionary before any query runs.

use std::collections::BTreeMap;
use std::sync::Arc;

use nutrifolio_core::{MenuCategory, MenuCategoryId, Tag, TagId};

use crate::catalog::Catalog;
use crate::db::RepositoryError;

/// Immutable tag and menu-category lookup tables.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    inner: Arc<ReferenceDataInner>,
}

#[derive(Debug, Default)]
struct ReferenceDataInner {
    tags: BTreeMap<TagId, Tag>,
    menu_categories: BTreeMap<MenuCategoryId, MenuCategory>,
}

impl ReferenceData {
    #[must_use]
    pub fn new(
        tags: impl IntoIterator<Item = Tag>,
        menu_categories: impl IntoIterator<Item = MenuCategory>,
    ) -> Self {
        Self {
            inner: Arc::new(ReferenceDataInner {
                tags: tags.into_iter().map(|tag| (tag.id, tag)).collect(),
                menu_categories: menu_categories
                    .into_iter()
                    .map(|category| (category.id, category))
                    .collect(),
            }),
        }
    }

    /// Load both sets from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if either set cannot be read.
    pub async fn load(catalog: &dyn Catalog) -> Result<Self, RepositoryError> {
        let tags = catalog.all_tags().await?;
        let menu_categories = catalog.all_menu_categories().await?;

        tracing::info!(
            tag_count = tags.len(),
            menu_category_count = menu_categories.len(),
            "Reference data loaded"
        );

        Ok(Self::new(tags, menu_categories))
    }

    #[must_use]
    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        self.inner.tags.get(&id)
    }

    #[must_use]
    pub fn menu_category(&self, id: MenuCategoryId) -> Option<&MenuCategory> {
        self.inner.menu_categories.get(&id)
    }

    /// All tags, ascending by id.
    pub fn tags(&self) -> impl Iterator<Item = &Tag> {
        self.inner.tags.values()
    }

    /// All menu categories, ascending by id.
    pub fn menu_categories(&self) -> impl Iterator<Item = &MenuCategory> {
        self.inner.menu_categories.values()
    }
}
