//! Marketing-page signup repository
//!
//! Newsletter, referral and waitlist writes from the public landing page.
//! Duplicate signups are absorbed rather than surfaced as errors.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::db::DbPool;

/// Outreach repository trait
#[async_trait]
pub trait OutreachRepository: Send + Sync {
    /// Subscribe an email to the newsletter; duplicates are ignored
    async fn subscribe(&self, email: &str) -> Result<()>;

    /// Record a referral
    async fn add_referral(&self, referrer_email: &str, referred_email: &str) -> Result<()>;

    /// Join a feature waitlist; duplicates are ignored
    async fn join_waitlist(&self, email: &str, feature: &str) -> Result<()>;

    /// Count a referrer's registrations
    async fn referral_count(&self, referrer_email: &str) -> Result<i64>;
}

/// SQLx-based outreach repository
pub struct SqlxOutreachRepository {
    pool: DbPool,
}

impl SqlxOutreachRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn OutreachRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl OutreachRepository for SqlxOutreachRepository {
    async fn subscribe(&self, email: &str) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO subscribers (email, created_at) VALUES (?, ?)")
            .bind(email.to_lowercase())
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to add subscriber")?;
        Ok(())
    }

    async fn add_referral(&self, referrer_email: &str, referred_email: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO referrals (referrer_email, referred_email, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(referrer_email.to_lowercase())
        .bind(referred_email.to_lowercase())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to record referral")?;
        Ok(())
    }

    async fn join_waitlist(&self, email: &str, feature: &str) -> Result<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO waitlist_emails (email, feature, created_at) VALUES (?, ?, ?)",
        )
        .bind(email.to_lowercase())
        .bind(feature)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .context("Failed to join waitlist")?;
        Ok(())
    }

    async fn referral_count(&self, referrer_email: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM referrals WHERE referrer_email = ?")
            .bind(referrer_email.to_lowercase())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count referrals")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[tokio::test]
    async fn test_subscribe_ignores_duplicates() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxOutreachRepository::new(pool.clone());

        repo.subscribe("Anna@Example.com").await.unwrap();
        repo.subscribe("anna@example.com").await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscribers")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_referral_count() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxOutreachRepository::new(pool);

        repo.add_referral("anna@example.com", "maja@example.com").await.unwrap();
        repo.add_referral("anna@example.com", "eva@example.com").await.unwrap();

        assert_eq!(repo.referral_count("ANNA@example.com").await.unwrap(), 2);
        assert_eq!(repo.referral_count("other@example.com").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_waitlist_unique_per_feature() {
        let pool = create_test_pool().await.unwrap();
        let repo = SqlxOutreachRepository::new(pool.clone());

        repo.join_waitlist("anna@example.com", "specialist").await.unwrap();
        repo.join_waitlist("anna@example.com", "specialist").await.unwrap();
        repo.join_waitlist("anna@example.com", "premium").await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM waitlist_emails")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 2);
    }
}
