//! Route tables: static declarations binding method+path to a middleware
//! chain ending in a handler. Layers run loaders first, then the session
//! guard, then the authorization guards.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::database::pool;
use crate::handlers::{auth, category, order, payment, product, user};
use crate::middleware::{
    category_by_id, is_admin, is_auth, product_by_id, require_signin, user_by_id,
};
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth_routes())
        .merge(user_routes(state.clone()))
        .merge(category_routes(state.clone()))
        .merge(product_routes(state.clone()))
        .merge(order_routes(state.clone()))
        .merge(payment_routes(state.clone()))
        .layer(DefaultBodyLimit::max(
            config::config().api.max_request_size_bytes,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/signin", post(auth::signin))
        .route("/signout", get(auth::signout))
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/user/:userId",
            get(user::read).put(user::update).delete(user::remove),
        )
        .route_layer(from_fn(is_auth))
        .route_layer(from_fn(require_signin))
        .route_layer(from_fn_with_state(state, user_by_id))
}

fn category_routes(state: AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/category/:categoryId", get(category::read))
        .route_layer(from_fn_with_state(state.clone(), category_by_id));

    let create = Router::new()
        .route("/category/create/:userId", post(category::create))
        .route_layer(from_fn(is_admin))
        .route_layer(from_fn(is_auth))
        .route_layer(from_fn(require_signin))
        .route_layer(from_fn_with_state(state.clone(), user_by_id));

    let write = Router::new()
        .route(
            "/category/:categoryId/:userId",
            put(category::update).delete(category::remove),
        )
        .route_layer(from_fn(is_admin))
        .route_layer(from_fn(is_auth))
        .route_layer(from_fn(require_signin))
        .route_layer(from_fn_with_state(state.clone(), user_by_id))
        .route_layer(from_fn_with_state(state, category_by_id));

    Router::new()
        .merge(read)
        .merge(create)
        .merge(write)
        .route("/categories", get(category::list))
}

fn product_routes(state: AppState) -> Router<AppState> {
    let read = Router::new()
        .route("/product/:productId", get(product::read))
        .route("/product/photo/:productId", get(product::photo))
        .route("/products/related/:productId", get(product::list_related))
        .route_layer(from_fn_with_state(state.clone(), product_by_id));

    let create = Router::new()
        .route("/product/create/:userId", post(product::create))
        .route_layer(from_fn(is_admin))
        .route_layer(from_fn(is_auth))
        .route_layer(from_fn(require_signin))
        .route_layer(from_fn_with_state(state.clone(), user_by_id));

    let write = Router::new()
        .route(
            "/product/:productId/:userId",
            put(product::update).delete(product::remove),
        )
        .route_layer(from_fn(is_admin))
        .route_layer(from_fn(is_auth))
        .route_layer(from_fn(require_signin))
        .route_layer(from_fn_with_state(state.clone(), user_by_id))
        .route_layer(from_fn_with_state(state, product_by_id));

    Router::new()
        .merge(read)
        .merge(create)
        .merge(write)
        .route("/products", get(product::list))
        .route("/products/search", get(product::list_search))
        .route("/products/categories", get(product::list_categories))
        .route("/products/by/search", post(product::list_by_search))
}

fn order_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/order/create/:userId", post(order::create))
        .route_layer(from_fn(is_auth))
        .route_layer(from_fn(require_signin))
        .route_layer(from_fn_with_state(state, user_by_id))
}

fn payment_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/braintree/getToken/:userId", get(payment::generate_token))
        .route("/braintree/payment/:userId", post(payment::process_payment))
        .route_layer(from_fn(is_auth))
        .route_layer(from_fn(require_signin))
        .route_layer(from_fn_with_state(state, user_by_id))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match pool::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok",
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string(),
            })),
        ),
    }
}
