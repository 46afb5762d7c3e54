use serde_json::json;
use sqlx::{self, postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::database::pool::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::filter::FilterData;

/// Typed read access to one table, driven by filter data.
pub struct Repository<T> {
    table_name: String,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>, pool: PgPool) -> Self {
        Self {
            table_name: table_name.into(),
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn select_any(&self, filter_data: FilterData) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(&self.table_name)?
            .filter(filter_data)?
            .select_all(&self.pool)
            .await
    }

    pub async fn select_ids(&self, ids: Vec<Uuid>) -> Result<Vec<T>, DatabaseError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let filter = FilterData {
            where_clause: Some(json!({ "id": { "$in": ids } })),
            ..Default::default()
        };
        self.select_any(filter).await
    }
}
