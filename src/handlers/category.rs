use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::database::models::Category;
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::PathCategory;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: Option<String>,
}

impl CategoryRequest {
    fn name(&self) -> Result<&str, ApiError> {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(ApiError::bad_request("Name is required")),
        }
    }
}

/// POST /category/create/:userId (admin)
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let category = Category::create(&state.pool, body.name()?).await?;
    Ok(Json(category))
}

/// GET /category/:categoryId
pub async fn read(Extension(PathCategory(category)): Extension<PathCategory>) -> Json<Category> {
    Json(category)
}

/// PUT /category/:categoryId/:userId (admin) - replaces the name
pub async fn update(
    State(state): State<AppState>,
    Extension(PathCategory(category)): Extension<PathCategory>,
    Json(body): Json<CategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let category = Category::rename(&state.pool, category.id, body.name()?).await?;
    Ok(Json(category))
}

/// DELETE /category/:categoryId/:userId (admin)
pub async fn remove(
    State(state): State<AppState>,
    Extension(PathCategory(category)): Extension<PathCategory>,
) -> Result<impl IntoResponse, ApiError> {
    Category::delete(&state.pool, category.id).await?;
    Ok(Json(json!({ "message": "Category deleted successfully" })))
}

/// GET /categories - all categories, unfiltered
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = Repository::<Category>::new("categories", state.pool.clone())
        .select_any(FilterData::default())
        .await?;
    Ok(Json(categories))
}
