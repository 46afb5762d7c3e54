use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::database::models::{product, Product, ProductResponse};
use crate::database::Repository;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::middleware::PathProduct;
use crate::state::AppState;

/// Upper bound on a stored photo payload, in bytes.
const MAX_PHOTO_BYTES: usize = 1_000_000;

const DEFAULT_LIST_LIMIT: i32 = 6;
const DEFAULT_SEARCH_LIMIT: i32 = 100;

// ---------------------------------------------------------------------------
// Multipart form handling

#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    category: Option<Uuid>,
    quantity: Option<i32>,
    shipping: Option<bool>,
    photo: Option<(Vec<u8>, String)>,
}

/// Read the multipart fields into a form, ignoring unrecognized parts.
/// Values are parsed eagerly so a bad field fails before any store write.
async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm, ApiError> {
    let upload_err = || ApiError::bad_request("Image could not be uploaded");

    let mut form = ProductForm::default();
    while let Some(field) = multipart.next_field().await.map_err(|_| upload_err())? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "photo" => {
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let data = field.bytes().await.map_err(|_| upload_err())?;
                if !data.is_empty() {
                    form.photo = Some((data.to_vec(), content_type));
                }
            }
            "name" => form.name = Some(field.text().await.map_err(|_| upload_err())?),
            "description" => {
                form.description = Some(field.text().await.map_err(|_| upload_err())?)
            }
            "price" => {
                let text = field.text().await.map_err(|_| upload_err())?;
                let price = text
                    .parse::<Decimal>()
                    .map_err(|_| ApiError::bad_request("Invalid price"))?;
                form.price = Some(price);
            }
            "category" => {
                let text = field.text().await.map_err(|_| upload_err())?;
                let id = Uuid::parse_str(&text)
                    .map_err(|_| ApiError::bad_request("Category does not exist"))?;
                form.category = Some(id);
            }
            "quantity" => {
                let text = field.text().await.map_err(|_| upload_err())?;
                let quantity = text
                    .parse::<i32>()
                    .map_err(|_| ApiError::bad_request("Invalid quantity"))?;
                form.quantity = Some(quantity);
            }
            "shipping" => {
                let text = field.text().await.map_err(|_| upload_err())?;
                form.shipping = Some(parse_shipping(&text)?);
            }
            _ => {}
        }
    }
    Ok(form)
}

fn parse_shipping(value: &str) -> Result<bool, ApiError> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ApiError::bad_request("Invalid shipping")),
    }
}

fn check_photo_size(form: &ProductForm, message: &str) -> Result<(), ApiError> {
    match &form.photo {
        Some((data, _)) if data.len() > MAX_PHOTO_BYTES => Err(ApiError::bad_request(message)),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// CRUD

/// POST /product/create/:userId (admin) - multipart form, all fields
/// required, photo optional and size-capped
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    let form = read_product_form(multipart).await?;

    let (Some(name), Some(description), Some(price), Some(category), Some(quantity), Some(shipping)) = (
        form.name.clone(),
        form.description.clone(),
        form.price,
        form.category,
        form.quantity,
        form.shipping,
    ) else {
        return Err(ApiError::bad_request("All fields are required"));
    };

    check_photo_size(&form, "Image should be less than 1mb in size")?;
    let photo = form.photo.as_ref().map(|(d, ct)| (d.as_slice(), ct.as_str()));

    let created = Product::create(
        &state.pool,
        &name,
        &description,
        price,
        category,
        quantity,
        shipping,
        photo,
    )
    .await?;
    Ok(Json(created))
}

/// GET /product/:productId - photo stripped, category populated
pub async fn read(
    State(state): State<AppState>,
    Extension(PathProduct(product)): Extension<PathProduct>,
) -> Result<Json<ProductResponse>, ApiError> {
    let mut populated = Product::populate(&state.pool, vec![product]).await?;
    populated
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::bad_request("Product not found"))
}

/// PUT /product/:productId/:userId (admin) - partial merge over the
/// loaded record; only the allow-listed fields are mutable
pub async fn update(
    State(state): State<AppState>,
    Extension(PathProduct(mut product)): Extension<PathProduct>,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    let form = read_product_form(multipart).await?;
    check_photo_size(&form, "Image should be less than 1mb")?;

    if let Some(name) = form.name {
        product.name = name;
    }
    if let Some(description) = form.description {
        product.description = description;
    }
    if let Some(price) = form.price {
        product.price = price;
    }
    if let Some(category) = form.category {
        product.category_id = category;
    }
    if let Some(quantity) = form.quantity {
        product.quantity = quantity;
    }
    if let Some(shipping) = form.shipping {
        product.shipping = shipping;
    }

    let photo = form.photo.as_ref().map(|(d, ct)| (d.as_slice(), ct.as_str()));
    let updated = product.update(&state.pool, photo).await?;
    Ok(Json(updated))
}

/// DELETE /product/:productId/:userId (admin)
pub async fn remove(
    State(state): State<AppState>,
    Extension(PathProduct(product)): Extension<PathProduct>,
) -> Result<impl IntoResponse, ApiError> {
    Product::delete(&state.pool, product.id).await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

/// GET /product/photo/:productId - stored bytes with their content type
pub async fn photo(
    State(state): State<AppState>,
    Extension(PathProduct(product)): Extension<PathProduct>,
) -> Result<Response, ApiError> {
    if let Some(stored) = Product::photo(&state.pool, product.id).await? {
        if let Some(data) = stored.photo_data {
            let content_type = stored
                .photo_content_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            return Ok(([(header::CONTENT_TYPE, content_type)], data).into_response());
        }
    }
    Ok(StatusCode::NO_CONTENT.into_response())
}

// ---------------------------------------------------------------------------
// Listing and search

/// Sort keys accepted on the wire, mapped to their columns. The document
/// API's spellings stay supported alongside the column names themselves.
fn sort_column(api_field: &str) -> Result<&'static str, ApiError> {
    match api_field {
        "_id" | "id" => Ok("id"),
        "createdAt" | "created_at" => Ok("created_at"),
        "updatedAt" | "updated_at" => Ok("updated_at"),
        "name" => Ok("name"),
        "price" => Ok("price"),
        "quantity" => Ok("quantity"),
        "sold" => Ok("sold"),
        _ => Err(ApiError::bad_request("Invalid sort field")),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i32>,
}

/// GET /products?sortBy=&order=&limit= - by sell: sortBy=sold&order=desc,
/// by arrival: sortBy=createdAt&order=desc
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let order = query.order.unwrap_or_else(|| "asc".to_string());
    let sort_by = query.sort_by.unwrap_or_else(|| "_id".to_string());
    let column = sort_column(&sort_by)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);

    let products = Repository::<Product>::new("products", state.pool.clone())
        .select_any(FilterData {
            select: Some(product::select_columns()),
            order: Some(json!({ column: order })),
            limit: Some(limit),
            ..Default::default()
        })
        .await?;

    let populated = Product::populate(&state.pool, products).await?;
    Ok(Json(populated))
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<i32>,
}

/// GET /products/related/:productId - same category, current id excluded
pub async fn list_related(
    State(state): State<AppState>,
    Extension(PathProduct(current)): Extension<PathProduct>,
    Query(query): Query<RelatedQuery>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);

    let products = Repository::<Product>::new("products", state.pool.clone())
        .select_any(FilterData {
            select: Some(product::select_columns()),
            where_clause: Some(json!({
                "category_id": current.category_id,
                "id": { "$ne": current.id },
            })),
            limit: Some(limit),
            ..Default::default()
        })
        .await?;

    let populated = Product::populate(&state.pool, products).await?;
    Ok(Json(populated))
}

/// GET /products/categories - distinct category ids in use
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Uuid>>, ApiError> {
    let ids = Product::used_categories(&state.pool).await?;
    Ok(Json(ids))
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    pub order: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub limit: Option<i32>,
    pub skip: Option<i32>,
    pub filters: Option<Map<String, Value>>,
}

/// Filter keys accepted from the client, mapped to columns. Unrecognized
/// keys and empty value sets are ignored. `price` is an inclusive
/// [min, max] range; other array values are set membership; scalars are
/// equality.
fn build_search_where(filters: &Map<String, Value>) -> Option<Value> {
    let mut conditions = Map::new();
    for (key, value) in filters {
        let column = match key.as_str() {
            "category" => "category_id",
            "price" => "price",
            "name" => "name",
            "shipping" => "shipping",
            "quantity" => "quantity",
            "sold" => "sold",
            _ => continue,
        };
        match value {
            Value::Array(values) if !values.is_empty() => {
                if column == "price" {
                    if values.len() == 2 {
                        conditions.insert(column.to_string(), json!({ "$between": values }));
                    }
                } else {
                    conditions.insert(column.to_string(), json!({ "$in": values }));
                }
            }
            Value::String(s) if !s.is_empty() => {
                conditions.insert(column.to_string(), value.clone());
            }
            Value::Number(_) | Value::Bool(_) => {
                conditions.insert(column.to_string(), value.clone());
            }
            _ => {}
        }
    }
    if conditions.is_empty() {
        None
    } else {
        Some(Value::Object(conditions))
    }
}

/// POST /products/by/search - dynamic field filters with skip/limit
/// pagination; returns `{size, data}`
pub async fn list_by_search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Json<Value>, ApiError> {
    let order = body.order.unwrap_or_else(|| "desc".to_string());
    let sort_by = body.sort_by.unwrap_or_else(|| "_id".to_string());
    let column = sort_column(&sort_by)?;
    let limit = body.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let skip = body.skip.unwrap_or(0);

    let where_clause = body.filters.as_ref().and_then(build_search_where);

    let products = Repository::<Product>::new("products", state.pool.clone())
        .select_any(FilterData {
            select: Some(product::select_columns()),
            where_clause,
            order: Some(json!({ column: order })),
            limit: Some(limit),
            offset: Some(skip),
        })
        .await?;

    let populated = Product::populate(&state.pool, products).await?;
    Ok(Json(json!({
        "size": populated.len(),
        "data": populated,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

/// GET /products/search?search=&category= - case-insensitive substring
/// match on name; runs only when a search term is supplied
pub async fn list_search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let term = match query.search.as_deref() {
        Some(term) if !term.is_empty() => term,
        _ => return Ok(Json(vec![])),
    };

    let mut conditions = Map::new();
    conditions.insert(
        "name".to_string(),
        json!({ "$ilike": format!("%{}%", term) }),
    );
    if let Some(category) = query.category.as_deref() {
        if category != "All" {
            conditions.insert("category_id".to_string(), json!(category));
        }
    }

    let products = Repository::<Product>::new("products", state.pool.clone())
        .select_any(FilterData {
            select: Some(product::select_columns()),
            where_clause: Some(Value::Object(conditions)),
            ..Default::default()
        })
        .await?;
    Ok(Json(products))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_fields_map_to_columns() {
        assert_eq!(sort_column("_id").unwrap(), "id");
        assert_eq!(sort_column("createdAt").unwrap(), "created_at");
        assert_eq!(sort_column("sold").unwrap(), "sold");
        assert!(sort_column("hashed_password").is_err());
        assert!(sort_column("price; DROP TABLE products").is_err());
    }

    #[test]
    fn price_filter_becomes_inclusive_range() {
        let filters = serde_json::from_value::<Map<String, Value>>(
            json!({ "price": [10, 50] }),
        )
        .unwrap();
        let clause = build_search_where(&filters).unwrap();
        assert_eq!(clause, json!({ "price": { "$between": [10, 50] } }));
    }

    #[test]
    fn array_filter_becomes_set_membership() {
        let filters = serde_json::from_value::<Map<String, Value>>(
            json!({ "category": ["a", "b"] }),
        )
        .unwrap();
        let clause = build_search_where(&filters).unwrap();
        assert_eq!(clause, json!({ "category_id": { "$in": ["a", "b"] } }));
    }

    #[test]
    fn empty_and_unknown_filters_are_ignored() {
        let filters = serde_json::from_value::<Map<String, Value>>(json!({
            "category": [],
            "role": [1],
            "price": [10],
        }))
        .unwrap();
        assert!(build_search_where(&filters).is_none());
    }

    #[test]
    fn scalar_filter_becomes_equality() {
        let filters = serde_json::from_value::<Map<String, Value>>(
            json!({ "shipping": true }),
        )
        .unwrap();
        let clause = build_search_where(&filters).unwrap();
        assert_eq!(clause, json!({ "shipping": true }));
    }

    #[test]
    fn shipping_parses_form_booleans() {
        assert!(parse_shipping("true").unwrap());
        assert!(!parse_shipping("0").unwrap());
        assert!(parse_shipping("maybe").is_err());
    }
}
