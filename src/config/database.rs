//! PostgreSQL connection pool initialization.
//!
//! Reads `DATABASE_URL` (required) and `DATABASE_MAX_CONNECTIONS`
//! (optional, defaults to 10). Panics on a missing URL or a failed
//! connection; there is nothing useful the server can do without a
//! database.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

/// Initializes the shared PostgreSQL connection pool.
///
/// The returned [`PgPool`] is cheaply cloneable; it is created once at
/// startup and handed to the application state.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}
