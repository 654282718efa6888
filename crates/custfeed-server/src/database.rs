//! PostgreSQL access: pool construction and customer queries.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::ServerConfig;

/// Build the shared connection pool.
///
/// The pool connects lazily, so the server comes up even while the store is
/// unreachable and each query surfaces the failure per request.
pub fn connect_pool(config: &ServerConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.pool_max_connections)
        .acquire_timeout(config.pool_acquire_timeout)
        .idle_timeout(config.pool_idle_timeout)
        .connect_lazy(&config.database_url)
}

/// Fetch all customer names, newest account code first.
pub async fn fetch_customer_names(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT name FROM acc_master ORDER BY code DESC")
        .fetch_all(pool)
        .await
}
