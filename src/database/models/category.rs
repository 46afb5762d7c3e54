use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::pool::DatabaseError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Category>, DatabaseError> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(category)
    }

    pub async fn create(pool: &PgPool, name: &str) -> Result<Category, DatabaseError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING *",
        )
        .bind(name.trim())
        .fetch_one(pool)
        .await?;
        Ok(category)
    }

    pub async fn rename(pool: &PgPool, id: Uuid, name: &str) -> Result<Category, DatabaseError> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $1, updated_at = now() WHERE id = $2 RETURNING *",
        )
        .bind(name.trim())
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(category)
    }

    /// Removal does not cascade: products keep their category reference
    /// and populated reads emit a null category for them.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
