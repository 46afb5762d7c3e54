use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::Category;
use crate::database::pool::DatabaseError;
use crate::database::repository::Repository;

/// Columns fetched for every standard read. The photo payload is
/// deliberately absent: it is served only by the dedicated photo route.
pub const PRODUCT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "description",
    "price",
    "category_id",
    "quantity",
    "sold",
    "shipping",
    "created_at",
    "updated_at",
];

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: Uuid,
    pub quantity: i32,
    pub sold: i32,
    pub shipping: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product with its category reference resolved, the wire shape of every
/// populated read. A dangling reference serializes as a null category.
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: Option<Category>,
    pub quantity: i32,
    pub sold: i32,
    pub shipping: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One order line item: `{_id, count}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub count: i32,
}

/// Stored photo payload.
#[derive(Debug, FromRow)]
pub struct ProductPhoto {
    pub photo_data: Option<Vec<u8>>,
    pub photo_content_type: Option<String>,
}

pub fn select_columns() -> Vec<String> {
    PRODUCT_COLUMNS.iter().map(|s| s.to_string()).collect()
}

impl Product {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Product>, DatabaseError> {
        let columns = PRODUCT_COLUMNS.join(", ");
        let query = format!("SELECT {} FROM products WHERE id = $1", columns);
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(product)
    }

    pub async fn create(
        pool: &PgPool,
        name: &str,
        description: &str,
        price: Decimal,
        category_id: Uuid,
        quantity: i32,
        shipping: bool,
        photo: Option<(&[u8], &str)>,
    ) -> Result<Product, DatabaseError> {
        let columns = PRODUCT_COLUMNS.join(", ");
        let query = format!(
            r#"
            INSERT INTO products
                (name, description, price, category_id, quantity, shipping,
                 photo_data, photo_content_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            columns
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(name)
            .bind(description)
            .bind(price)
            .bind(category_id)
            .bind(quantity)
            .bind(shipping)
            .bind(photo.map(|(data, _)| data.to_vec()))
            .bind(photo.map(|(_, content_type)| content_type.to_string()))
            .fetch_one(pool)
            .await?;
        Ok(product)
    }

    /// Persist merged fields. The photo columns are only overwritten when
    /// a new payload is provided.
    pub async fn update(
        &self,
        pool: &PgPool,
        photo: Option<(&[u8], &str)>,
    ) -> Result<Product, DatabaseError> {
        let columns = PRODUCT_COLUMNS.join(", ");
        let query = format!(
            r#"
            UPDATE products
            SET name = $1, description = $2, price = $3, category_id = $4,
                quantity = $5, shipping = $6,
                photo_data = COALESCE($7, photo_data),
                photo_content_type = COALESCE($8, photo_content_type),
                updated_at = now()
            WHERE id = $9
            RETURNING {}
            "#,
            columns
        );
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(&self.name)
            .bind(&self.description)
            .bind(self.price)
            .bind(self.category_id)
            .bind(self.quantity)
            .bind(self.shipping)
            .bind(photo.map(|(data, _)| data.to_vec()))
            .bind(photo.map(|(_, content_type)| content_type.to_string()))
            .bind(self.id)
            .fetch_one(pool)
            .await?;
        Ok(product)
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn photo(pool: &PgPool, id: Uuid) -> Result<Option<ProductPhoto>, DatabaseError> {
        let photo = sqlx::query_as::<_, ProductPhoto>(
            "SELECT photo_data, photo_content_type FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;
        Ok(photo)
    }

    /// Distinct category references actually used by at least one product.
    pub async fn used_categories(pool: &PgPool) -> Result<Vec<Uuid>, DatabaseError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT DISTINCT category_id FROM products")
            .fetch_all(pool)
            .await?;
        Ok(ids)
    }

    /// Fulfillment-time bulk adjustment: per line item,
    /// `quantity -= count; sold += count`, one single-row update each.
    /// Row updates are individually atomic but the batch is not: a
    /// failure partway leaves earlier items applied.
    pub async fn decrease_quantity(pool: &PgPool, items: &[OrderItem]) -> Result<(), DatabaseError> {
        for item in items {
            let result = sqlx::query(
                r#"
                UPDATE products
                SET quantity = quantity - $1, sold = sold + $1, updated_at = now()
                WHERE id = $2
                "#,
            )
            .bind(item.count)
            .bind(item.id)
            .execute(pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(DatabaseError::NotFound(format!(
                    "Product not found: {}",
                    item.id
                )));
            }
        }
        Ok(())
    }

    /// Resolve category references for a page of products, mongoose
    /// populate style: one batched lookup, then in-memory assembly.
    pub async fn populate(
        pool: &PgPool,
        products: Vec<Product>,
    ) -> Result<Vec<ProductResponse>, DatabaseError> {
        let mut ids: Vec<Uuid> = products.iter().map(|p| p.category_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let categories = Repository::<Category>::new("categories", pool.clone())
            .select_ids(ids)
            .await?;
        let by_id: HashMap<Uuid, Category> =
            categories.into_iter().map(|c| (c.id, c)).collect();

        Ok(products
            .into_iter()
            .map(|p| {
                let category = by_id.get(&p.category_id).cloned();
                ProductResponse {
                    id: p.id,
                    name: p.name,
                    description: p.description,
                    price: p.price,
                    category,
                    quantity: p.quantity,
                    sold: p.sold,
                    shipping: p.shipping,
                    created_at: p.created_at,
                    updated_at: p.updated_at,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn order_items_deserialize_from_wire_shape() {
        let id = Uuid::new_v4();
        let items: Vec<OrderItem> =
            serde_json::from_value(json!([{ "_id": id, "count": 2 }])).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, id);
        assert_eq!(items[0].count, 2);
    }

    #[test]
    fn standard_columns_exclude_photo() {
        assert!(!PRODUCT_COLUMNS.iter().any(|c| c.starts_with("photo")));
    }
}
