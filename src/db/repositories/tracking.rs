//! Tracking repository
//!
//! Breastfeeding sessions and elimination diary entries, always scoped to
//! one user. Range queries drive the daily views and the weekly reports.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{
    BreastSide, BreastfeedingSession, CaptureStatus, CreateEliminationInput, CreateSessionInput,
    EliminationEntry, EliminationType,
};

/// Tracking repository trait
#[async_trait]
pub trait TrackingRepository: Send + Sync {
    /// Record a breastfeeding session
    async fn create_session(
        &self,
        user_id: i64,
        input: CreateSessionInput,
    ) -> Result<BreastfeedingSession>;

    /// List a user's sessions within a time range, newest first
    async fn list_sessions(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BreastfeedingSession>>;

    /// Delete a session owned by the user
    async fn delete_session(&self, id: i64, user_id: i64) -> Result<bool>;

    /// Record an elimination diary entry
    async fn create_elimination(
        &self,
        user_id: i64,
        input: CreateEliminationInput,
    ) -> Result<EliminationEntry>;

    /// List a user's elimination entries within a time range, newest first
    async fn list_eliminations(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EliminationEntry>>;

    /// Delete an elimination entry owned by the user
    async fn delete_elimination(&self, id: i64, user_id: i64) -> Result<bool>;
}

/// SQLx-based tracking repository
pub struct SqlxTrackingRepository {
    pool: DbPool,
}

impl SqlxTrackingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn TrackingRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl TrackingRepository for SqlxTrackingRepository {
    async fn create_session(
        &self,
        user_id: i64,
        input: CreateSessionInput,
    ) -> Result<BreastfeedingSession> {
        let result = sqlx::query(
            r#"
            INSERT INTO breastfeeding_sessions
                (user_id, started_at, ended_at, duration_seconds, side, notes)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(input.started_at)
        .bind(input.ended_at)
        .bind(input.duration_seconds)
        .bind(input.side.as_str())
        .bind(&input.notes)
        .execute(&self.pool)
        .await
        .context("Failed to create breastfeeding session")?;

        Ok(BreastfeedingSession {
            id: result.last_insert_rowid(),
            user_id,
            started_at: input.started_at,
            ended_at: input.ended_at,
            duration_seconds: input.duration_seconds,
            side: input.side,
            notes: input.notes,
        })
    }

    async fn list_sessions(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BreastfeedingSession>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM breastfeeding_sessions
            WHERE user_id = ? AND started_at >= ? AND started_at < ?
            ORDER BY started_at DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list breastfeeding sessions")?;

        rows.iter().map(row_to_session).collect()
    }

    async fn delete_session(&self, id: i64, user_id: i64) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM breastfeeding_sessions WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .context("Failed to delete breastfeeding session")?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_elimination(
        &self,
        user_id: i64,
        input: CreateEliminationInput,
    ) -> Result<EliminationEntry> {
        let signals_json =
            serde_json::to_string(&input.signals).context("Failed to serialize signals")?;

        let result = sqlx::query(
            r#"
            INSERT INTO elimination_entries
                (user_id, occurred_at, elimination_type, location, capture_status, signals, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(input.occurred_at)
        .bind(input.elimination_type.as_str())
        .bind(&input.location)
        .bind(input.capture_status.as_str())
        .bind(&signals_json)
        .bind(&input.notes)
        .execute(&self.pool)
        .await
        .context("Failed to create elimination entry")?;

        Ok(EliminationEntry {
            id: result.last_insert_rowid(),
            user_id,
            occurred_at: input.occurred_at,
            elimination_type: input.elimination_type,
            location: input.location,
            capture_status: input.capture_status,
            signals: input.signals,
            notes: input.notes,
        })
    }

    async fn list_eliminations(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EliminationEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM elimination_entries
            WHERE user_id = ? AND occurred_at >= ? AND occurred_at < ?
            ORDER BY occurred_at DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list elimination entries")?;

        rows.iter().map(row_to_elimination).collect()
    }

    async fn delete_elimination(&self, id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM elimination_entries WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete elimination entry")?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<BreastfeedingSession> {
    let side: String = row.get("side");
    Ok(BreastfeedingSession {
        id: row.get("id"),
        user_id: row.get("user_id"),
        started_at: row.get("started_at"),
        ended_at: row.get("ended_at"),
        duration_seconds: row.get("duration_seconds"),
        side: BreastSide::parse(&side).ok_or_else(|| anyhow!("Unknown side: {}", side))?,
        notes: row.get("notes"),
    })
}

fn row_to_elimination(row: &sqlx::sqlite::SqliteRow) -> Result<EliminationEntry> {
    let elimination_type: String = row.get("elimination_type");
    let capture_status: String = row.get("capture_status");
    let signals_json: String = row.get("signals");
    let signals: Vec<String> =
        serde_json::from_str(&signals_json).context("Failed to parse signals")?;

    Ok(EliminationEntry {
        id: row.get("id"),
        user_id: row.get("user_id"),
        occurred_at: row.get("occurred_at"),
        elimination_type: EliminationType::parse(&elimination_type)
            .ok_or_else(|| anyhow!("Unknown elimination type: {}", elimination_type))?,
        location: row.get("location"),
        capture_status: CaptureStatus::parse(&capture_status)
            .ok_or_else(|| anyhow!("Unknown capture status: {}", capture_status))?,
        signals,
        notes: row.get("notes"),
    })
}
