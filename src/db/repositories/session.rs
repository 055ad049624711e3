//! Session repository
//!
//! Database operations for user sessions. Session presence is the only
//! authorization gate in the system; expired rows are purged by a
//! background task.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::Session;

/// Session repository trait
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a new session
    async fn create(&self, session: &Session) -> Result<()>;

    /// Get a session by its token id
    async fn get_by_id(&self, id: &str) -> Result<Option<Session>>;

    /// Delete a session (sign-out)
    async fn delete(&self, id: &str) -> Result<()>;

    /// Delete expired sessions, returning how many were removed
    async fn delete_expired(&self) -> Result<u64>;
}

/// SQLx-based session repository
pub struct SqlxSessionRepository {
    pool: DbPool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn SessionRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create session")?;
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Session>> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get session")?;

        Ok(row.map(|r| Session {
            id: r.get("id"),
            user_id: r.get("user_id"),
            expires_at: r.get("expires_at"),
            created_at: r.get("created_at"),
        }))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::{SqlxUserRepository, UserRepository};
    use chrono::Duration;

    async fn setup() -> (DbPool, i64) {
        let pool = create_test_pool().await.unwrap();
        let users = SqlxUserRepository::new(pool.clone());
        let user = users.find_or_create_by_email("a@b.se", "sv").await.unwrap();
        (pool, user.id)
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (pool, user_id) = setup().await;
        let repo = SqlxSessionRepository::new(pool);

        let session = Session::new(user_id);
        repo.create(&session).await.unwrap();

        let loaded = repo.get_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(loaded.user_id, user_id);
    }

    #[tokio::test]
    async fn test_delete() {
        let (pool, user_id) = setup().await;
        let repo = SqlxSessionRepository::new(pool);

        let session = Session::new(user_id);
        repo.create(&session).await.unwrap();
        repo.delete(&session.id).await.unwrap();

        assert!(repo.get_by_id(&session.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_expired_keeps_live_sessions() {
        let (pool, user_id) = setup().await;
        let repo = SqlxSessionRepository::new(pool);

        let live = Session::new(user_id);
        let mut expired = Session::new(user_id);
        expired.expires_at = Utc::now() - Duration::hours(1);

        repo.create(&live).await.unwrap();
        repo.create(&expired).await.unwrap();

        assert_eq!(repo.delete_expired().await.unwrap(), 1);
        assert!(repo.get_by_id(&live.id).await.unwrap().is_some());
        assert!(repo.get_by_id(&expired.id).await.unwrap().is_none());
    }
}
