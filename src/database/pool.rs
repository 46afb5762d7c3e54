use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432/bazaar";

/// Errors from the store layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Build the connection pool from DATABASE_URL.
///
/// Connections are established lazily so the process can boot (and report
/// a degraded /health) without a reachable database.
pub fn connect() -> Result<PgPool, DatabaseError> {
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| {
        warn!("DATABASE_URL not set, using {}", DEFAULT_DATABASE_URL);
        DEFAULT_DATABASE_URL.to_string()
    });

    let db_config = &config::config().database;
    let pool = PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(Duration::from_secs(db_config.connection_timeout))
        .connect_lazy(&url)?;

    Ok(pool)
}

/// Apply embedded migrations, tolerating an unreachable database.
pub async fn migrate(pool: &PgPool) {
    match sqlx::migrate!().run(pool).await {
        Ok(()) => info!("database migrations up to date"),
        Err(e) => warn!("skipping migrations, database unavailable: {}", e),
    }
}

/// Pings the database to confirm connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Convert a store error into the single client-facing message the API
/// reports. Unique-constraint violations name the offending field; other
/// failures stay generic.
pub fn format_store_error(err: &sqlx::Error) -> String {
    if let sqlx::Error::Database(db_err) = err {
        if db_err.is_unique_violation() {
            let field = db_err
                .constraint()
                .and_then(|c| c.split('_').nth(1))
                .unwrap_or("record");
            return format!("{} already exists", capitalize(field));
        }
    }
    tracing::error!("store error: {}", err);
    "Could not process the request".to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
