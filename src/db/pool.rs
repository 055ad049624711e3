//! SQLite connection pool
//!
//! The service runs single-binary on SQLite. The pool is created from the
//! configured file path (parent directories are created on demand) or from
//! ":memory:" for tests.

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;

/// Shared connection pool type
pub type DbPool = SqlitePool;

/// Create a connection pool from configuration.
///
/// File-backed databases are created on first connect (`mode=rwc`) and
/// foreign keys are enabled on the pool.
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let url = &config.url;

    let connection_url = if url == ":memory:" || url.starts_with("sqlite::memory:") {
        "sqlite::memory:".to_string()
    } else {
        let path = url.strip_prefix("sqlite:").unwrap_or(url);
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
            }
        }
        if url.contains('?') {
            format!("sqlite:{}", path)
        } else {
            format!("sqlite:{}?mode=rwc", path)
        }
    };

    // Every connection to ":memory:" opens its own database, so the
    // in-memory pool must stay at a single connection
    let max_connections = if connection_url == "sqlite::memory:" { 1 } else { 20 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&connection_url)
        .await
        .with_context(|| format!("Failed to connect to database: {}", url))?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await
        .context("Failed to enable foreign keys")?;

    Ok(pool)
}

/// Create an in-memory pool with the schema applied, for tests
pub async fn create_test_pool() -> Result<DbPool> {
    let config = DatabaseConfig {
        url: ":memory:".to_string(),
    };
    let pool = create_pool(&config).await?;
    super::migrations::run_migrations(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_pool_creation() {
        let config = DatabaseConfig {
            url: ":memory:".to_string(),
        };
        let pool = create_pool(&config).await.expect("Failed to create pool");
        let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await.unwrap();
        assert_eq!(one, 1);
    }

    #[tokio::test]
    async fn test_file_pool_creates_directories() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("test.db");

        let config = DatabaseConfig {
            url: db_path.to_string_lossy().to_string(),
        };
        let pool = create_pool(&config).await.expect("Failed to create pool");
        sqlx::query("SELECT 1").fetch_one(&pool).await.unwrap();
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_test_pool_has_schema() {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        // The posts table exists once migrations have run
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
