//! PostgreSQL persistence for images, points and boxes.

pub mod config;
pub mod models;
pub mod repositories;
pub mod store;

use std::sync::Arc;

use charpoints_core::lock::Lock;
use charpoints_core::services::Services;
use sqlx::postgres::PgPoolOptions;

pub use config::{ConfigError, DbConfig};
pub use store::PgStore;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from the configured URL and pool size.
pub async fn create_pool(config: &DbConfig) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
}

/// Round-trip a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations under `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Domain services backed by `pool`, sharing one lock built from `config`.
pub fn services(pool: DbPool, config: &DbConfig) -> Services {
    Services::new(
        Arc::new(PgStore::new(pool)),
        Lock::from_timeout(config.lock_timeout),
    )
}
