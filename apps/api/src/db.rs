use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

/// Schema for the submission table, column for column the layout existing
/// `resume_requests.db` files already have. Idempotent; an existing table is
/// reused unchanged.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS resume_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    full_name TEXT,
    email_address TEXT,
    phone_number TEXT,
    career_objective TEXT,
    education TEXT,
    skills TEXT,
    projects TEXT,
    work_experience TEXT,
    certifications TEXT,
    linkedin_url TEXT,
    github_url TEXT,
    transaction_id TEXT,
    payment_checkbox TEXT,
    payment_screenshot TEXT,
    job_description TEXT,
    is_verified INTEGER DEFAULT 0,
    resume_sent INTEGER DEFAULT 0,
    submission_timestamp TEXT
)
"#;

/// Creates and returns a SQLite connection pool, creating the database file if absent.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Opening SQLite database {database_url}...");

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    // An in-memory database lives and dies with its connection.
    let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Creates the submission table when it does not exist yet.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA).execute(pool).await?;
    info!("Schema ready (resume_requests)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        ensure_schema(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'resume_requests'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1);
    }
}
