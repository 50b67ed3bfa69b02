//! # MathEd DB
//!
//! Database pool and migrations for the MathEd API.
//!
//! # Example
//!
//! ```ignore
//! use mathed_db::{init_db_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = init_db_pool().await;
//!     run_migrations(&pool).await.expect("migrations failed");
//! }
//! ```

use std::env;
use std::time::Duration;

use sqlx::migrate::MigrateError;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Initializes a PostgreSQL connection pool.
///
/// Reads `DATABASE_URL` and, optionally, `DATABASE_MAX_CONNECTIONS`
/// (default 10).
///
/// # Panics
///
/// Panics if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
pub async fn init_db_pool() -> sqlx::PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

/// Applies the migrations embedded from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
