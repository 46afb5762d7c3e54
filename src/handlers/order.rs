use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::models::{OrderItem, Product, User};
use crate::error::ApiError;
use crate::middleware::PathUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub order: OrderPayload,
}

#[derive(Debug, Deserialize)]
pub struct OrderPayload {
    pub products: Vec<OrderItem>,
}

/// POST /order/create/:userId - fulfillment: bulk quantity adjustment,
/// then append the order to the account's history.
///
/// The adjustment is per-row atomic only. A failure partway reports the
/// single generic message and leaves earlier line items applied; nothing
/// is rolled back.
pub async fn create(
    State(state): State<AppState>,
    Extension(PathUser(user)): Extension<PathUser>,
    Json(body): Json<OrderRequest>,
) -> Result<Json<Value>, ApiError> {
    Product::decrease_quantity(&state.pool, &body.order.products)
        .await
        .map_err(|e| {
            tracing::warn!("bulk quantity adjustment failed: {}", e);
            ApiError::bad_request("Could not update product")
        })?;

    let entry = json!([{
        "products": body.order.products.iter()
            .map(|item| json!({ "_id": item.id, "count": item.count }))
            .collect::<Vec<_>>(),
    }]);
    User::push_history(&state.pool, user.id, &entry).await?;

    Ok(Json(json!({ "message": "Order placed" })))
}
