//! Post feedback repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{FeedbackStats, PostFeedback};

/// Feedback repository trait
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Record feedback on a post
    async fn create(
        &self,
        post_id: i64,
        user_id: Option<i64>,
        was_helpful: bool,
        suggestion: Option<String>,
    ) -> Result<PostFeedback>;

    /// Aggregate feedback counts for a post in one query
    async fn stats(&self, post_id: i64) -> Result<FeedbackStats>;
}

/// SQLx-based feedback repository
pub struct SqlxFeedbackRepository {
    pool: DbPool,
}

impl SqlxFeedbackRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn FeedbackRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl FeedbackRepository for SqlxFeedbackRepository {
    async fn create(
        &self,
        post_id: i64,
        user_id: Option<i64>,
        was_helpful: bool,
        suggestion: Option<String>,
    ) -> Result<PostFeedback> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO post_feedback (post_id, user_id, was_helpful, suggestion, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .bind(was_helpful)
        .bind(&suggestion)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to record feedback")?;

        Ok(PostFeedback {
            id: result.last_insert_rowid(),
            post_id,
            user_id,
            was_helpful,
            suggestion,
            created_at: now,
        })
    }

    async fn stats(&self, post_id: i64) -> Result<FeedbackStats> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total,
                   COALESCE(SUM(was_helpful), 0) AS helpful
            FROM post_feedback
            WHERE post_id = ?
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to aggregate feedback")?;

        Ok(FeedbackStats::new(
            post_id,
            row.get("total"),
            row.get("helpful"),
        ))
    }
}
