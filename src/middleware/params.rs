//! Parameter-resolution middleware: each loader resolves a path id into
//! its record and attaches it to the request for the guards and handlers
//! downstream. A missing record rejects before any handler logic runs.

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{Category, Product, User};
use crate::database::pool::DatabaseError;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Clone, Debug)]
pub struct PathUser(pub User);

#[derive(Clone, Debug)]
pub struct PathCategory(pub Category);

#[derive(Clone, Debug)]
pub struct PathProduct(pub Product);

pub async fn user_by_id(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let id = parse_id(&params, "userId", "User not found")?;
    let user = User::find_by_id(&state.pool, id)
        .await
        .map_err(load_error)?
        .ok_or_else(|| ApiError::bad_request("User not found"))?;

    request.extensions_mut().insert(PathUser(user));
    Ok(next.run(request).await)
}

pub async fn category_by_id(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let id = parse_id(&params, "categoryId", "Category does not exist")?;
    let category = Category::find_by_id(&state.pool, id)
        .await
        .map_err(load_error)?
        .ok_or_else(|| ApiError::bad_request("Category does not exist"))?;

    request.extensions_mut().insert(PathCategory(category));
    Ok(next.run(request).await)
}

pub async fn product_by_id(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let id = parse_id(&params, "productId", "Product not found")?;
    let product = Product::find_by_id(&state.pool, id)
        .await
        .map_err(load_error)?
        .ok_or_else(|| ApiError::bad_request("Product not found"))?;

    request.extensions_mut().insert(PathProduct(product));
    Ok(next.run(request).await)
}

// A malformed id gets the same fixed message as a missing record
fn parse_id(
    params: &HashMap<String, String>,
    key: &str,
    not_found: &str,
) -> Result<Uuid, ApiError> {
    params
        .get(key)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| ApiError::bad_request(not_found))
}

fn load_error(err: DatabaseError) -> ApiError {
    tracing::error!("failed to load path resource: {}", err);
    err.into()
}
