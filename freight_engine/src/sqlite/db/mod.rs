//! # SQLite database methods
//!
//! "Low-level" SQLite interactions for the fulfillment pipeline.
//!
//! These are plain functions rather than methods on a stateful struct. Each one accepts a `&mut SqliteConnection`, so
//! a caller can pass a pooled connection, or `&mut tx` to run several of them inside one atomic transaction, without
//! any other changes.
use std::env;

use log::info;
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::SqlitePoolOptions,
    Error as SqlxError,
    Sqlite,
    SqlitePool,
};

pub mod deliveries;
pub mod estimates;
pub mod matchings;
pub mod order_sheets;
pub mod payments;
pub mod profiles;
pub mod rejections;

const SQLITE_DB_URL: &str = "sqlite://data/freight_store.db";

pub fn db_url() -> String {
    let result = env::var("FPS_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ FPS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    if !Sqlite::database_exists(url).await? {
        info!("🗃️ Database {url} does not exist. Creating it now.");
        Sqlite::create_database(url).await?;
    }
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}
