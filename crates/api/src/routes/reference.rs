//! Tag and menu-category listings, served from the start-up dictionary.

use axum::{Json, extract::State};
use serde::Serialize;

use nutrifolio_core::{MenuCategory, Tag};

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<Tag>,
}

#[derive(Debug, Serialize)]
pub struct MenuCategoriesResponse {
    pub menu_categories: Vec<MenuCategory>,
}

/// All tags, ascending by id.
pub async fn list_tags(State(state): State<AppState>) -> Json<TagsResponse> {
    Json(TagsResponse {
        tags: state.reference().tags().cloned().collect(),
    })
}

/// All menu categories, ascending by id.
pub async fn list_menu_categories(State(state): State<AppState>) -> Json<MenuCategoriesResponse> {
    Json(MenuCategoriesResponse {
        menu_categories: state.reference().menu_categories().cloned().collect(),
    })
}
