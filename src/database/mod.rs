pub mod models;
pub mod pool;
pub mod query_builder;
pub mod repository;

pub use pool::DatabaseError;
pub use repository::Repository;
