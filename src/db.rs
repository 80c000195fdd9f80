use anyhow::{Context, Result};
use sqlx::MySqlPool;

const SCHEMA: &str = include_str!("../migrations/0001_leave_requests.sql");

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Creates the `leave_requests` table and its query indexes if missing.
pub async fn ensure_schema(pool: &MySqlPool) -> Result<()> {
    sqlx::query(SCHEMA)
        .execute(pool)
        .await
        .context("Failed to create leave_requests schema")?;

    tracing::info!("leave_requests schema ready");
    Ok(())
}
