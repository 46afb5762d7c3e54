use serde_json::Value;
use sqlx::{self, postgres::PgArguments, FromRow, PgPool};
use uuid::Uuid;

use crate::database::pool::DatabaseError;
use crate::filter::{Filter, FilterData};
use crate::filter::types::SqlResult;

pub struct QueryBuilder<T> {
    table_name: String,
    filter: Option<Filter>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>) -> Result<Self, DatabaseError> {
        let name = table_name.into();
        // Reuse Filter table name validation
        Filter::new(&name).map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        Ok(Self {
            table_name: name,
            filter: None,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn filter(mut self, filter_data: FilterData) -> Result<Self, DatabaseError> {
        let mut filter = Filter::new(&self.table_name)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        filter
            .assign(filter_data)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        self.filter = Some(filter);
        Ok(self)
    }

    pub async fn select_all(self, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.sql_result()?;
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }

    fn sql_result(&self) -> Result<SqlResult, DatabaseError> {
        if let Some(filter) = &self.filter {
            filter
                .to_sql()
                .map_err(|e| DatabaseError::QueryError(e.to_string()))
        } else {
            Ok(SqlResult {
                query: format!("SELECT * FROM \"{}\"", self.table_name),
                params: vec![],
            })
        }
    }
}

fn bind_param<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => {
            // Id filters arrive as strings; UUID-shaped values bind as
            // UUID so they compare against id columns. The only
            // free-text filter column (name) never takes that shape.
            if let Ok(id) = Uuid::parse_str(s) {
                q.bind(id)
            } else {
                q.bind(s)
            }
        }
        // Arrays are expanded into IN lists by FilterWhere before binding
        Value::Array(_) => q,
        Value::Object(_) => q.bind(v.clone()),
    }
}
