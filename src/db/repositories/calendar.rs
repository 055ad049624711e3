//! Calendar content repository
//!
//! Catalog lookups for one calendar day. Candidate rows must cover the
//! baby's age; rows that also pin the week offset or day of week win over
//! generic ones, so ordering by specificity with LIMIT 1 picks the best
//! match in a single query.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{CalendarContent, ContentType, MaternityPhase};

/// Input for seeding a catalog row
#[derive(Debug, Clone)]
pub struct NewCalendarContent {
    pub phase: MaternityPhase,
    pub age_min_days: i64,
    pub age_max_days: i64,
    pub week_offset: Option<i64>,
    pub day_of_week: Option<i32>,
    pub content_type: ContentType,
    pub url: Option<String>,
    pub content_data: serde_json::Value,
    pub premium: bool,
}

/// Calendar content repository trait
#[async_trait]
pub trait CalendarRepository: Send + Sync {
    /// Find the best catalog row for a baby age on a given weekday.
    ///
    /// A row matches when its age range covers `age_days` and its
    /// week_offset / day_of_week are either NULL or equal to the query
    /// values. More specific rows rank first.
    async fn find_for_day(
        &self,
        age_days: i64,
        week_offset: i64,
        day_of_week: i32,
    ) -> Result<Option<CalendarContent>>;

    /// Insert a catalog row
    async fn insert(&self, input: NewCalendarContent) -> Result<CalendarContent>;
}

/// SQLx-based calendar content repository
pub struct SqlxCalendarRepository {
    pool: DbPool,
}

impl SqlxCalendarRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn CalendarRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CalendarRepository for SqlxCalendarRepository {
    async fn find_for_day(
        &self,
        age_days: i64,
        week_offset: i64,
        day_of_week: i32,
    ) -> Result<Option<CalendarContent>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM calendar_contents
            WHERE age_min_days <= ? AND age_max_days >= ?
              AND (week_offset IS NULL OR week_offset = ?)
              AND (day_of_week IS NULL OR day_of_week = ?)
            ORDER BY
                (day_of_week IS NOT NULL) DESC,
                (week_offset IS NOT NULL) DESC,
                (age_max_days - age_min_days) ASC,
                id ASC
            LIMIT 1
            "#,
        )
        .bind(age_days)
        .bind(age_days)
        .bind(week_offset)
        .bind(day_of_week)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to look up calendar content")?;

        row.map(|r| row_to_content(&r)).transpose()
    }

    async fn insert(&self, input: NewCalendarContent) -> Result<CalendarContent> {
        let now = Utc::now();
        let content_data =
            serde_json::to_string(&input.content_data).context("Failed to serialize content")?;

        let result = sqlx::query(
            r#"
            INSERT INTO calendar_contents
                (phase, age_min_days, age_max_days, week_offset, day_of_week,
                 content_type, url, content_data, premium, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(input.phase.as_str())
        .bind(input.age_min_days)
        .bind(input.age_max_days)
        .bind(input.week_offset)
        .bind(input.day_of_week)
        .bind(input.content_type.as_str())
        .bind(&input.url)
        .bind(&content_data)
        .bind(input.premium)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to insert calendar content")?;

        Ok(CalendarContent {
            id: result.last_insert_rowid(),
            phase: input.phase,
            age_min_days: input.age_min_days,
            age_max_days: input.age_max_days,
            week_offset: input.week_offset,
            day_of_week: input.day_of_week,
            content_type: input.content_type,
            url: input.url,
            content_data: input.content_data,
            premium: input.premium,
            created_at: now,
        })
    }
}

fn row_to_content(row: &sqlx::sqlite::SqliteRow) -> Result<CalendarContent> {
    let phase: String = row.get("phase");
    let content_type: String = row.get("content_type");
    let content_data: String = row.get("content_data");

    Ok(CalendarContent {
        id: row.get("id"),
        phase: MaternityPhase::parse(&phase)
            .ok_or_else(|| anyhow!("Unknown maternity phase: {}", phase))?,
        age_min_days: row.get("age_min_days"),
        age_max_days: row.get("age_max_days"),
        week_offset: row.get("week_offset"),
        day_of_week: row.get("day_of_week"),
        content_type: ContentType::parse(&content_type)
            .ok_or_else(|| anyhow!("Unknown content type: {}", content_type))?,
        url: row.get("url"),
        content_data: serde_json::from_str(&content_data)
            .context("Failed to parse content payload")?,
        premium: row.get("premium"),
        created_at: row.get("created_at"),
    })
}
