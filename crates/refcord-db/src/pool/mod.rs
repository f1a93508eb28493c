//! Database connection pool management

mod sqlite;

pub use sqlite::{create_pool, run_migrations, DatabaseConfig, SCHEMA};

// Re-export SqlitePool for convenience
pub use sqlx::sqlite::SqlitePool;
