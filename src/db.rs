//! Database bootstrap: create the database if needed, open the pool, apply migrations

use std::time::Duration;

use sqlx::{
    migrate::{MigrateDatabase, Migrator},
    postgres::PgPoolOptions,
    PgPool, Postgres,
};

use crate::config::DatabaseConfig;

/// Schema migrations embedded at compile time
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Create the connection pool, creating the database first when allowed
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    if config.create_if_missing && !Postgres::database_exists(&config.url).await? {
        tracing::info!("Database does not exist, creating it");
        Postgres::create_database(&config.url).await?;
    }

    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
}

/// Apply pending migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
