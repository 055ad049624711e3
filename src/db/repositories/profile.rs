//! Profile repository
//!
//! One profile row per user with upsert semantics: onboarding completion
//! writes the whole record in one statement, and the onboarding flag is
//! read from this row only.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{BabyAvatar, ContentStyle, Interest, Profile, ProfileInput};

/// Profile repository trait
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Create or replace the profile for a user
    async fn upsert(&self, user_id: i64, input: ProfileInput) -> Result<Profile>;

    /// Get a user's profile
    async fn get(&self, user_id: i64) -> Result<Option<Profile>>;
}

/// SQLx-based profile repository
pub struct SqlxProfileRepository {
    pool: DbPool,
}

impl SqlxProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn ProfileRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ProfileRepository for SqlxProfileRepository {
    async fn upsert(&self, user_id: i64, input: ProfileInput) -> Result<Profile> {
        let now = Utc::now();
        let interests_json = serde_json::to_string(
            &input.interests.iter().map(Interest::as_str).collect::<Vec<_>>(),
        )
        .context("Failed to serialize interests")?;

        sqlx::query(
            r#"
            INSERT INTO profiles
                (user_id, name, birth_date, previous_births, baby_name, baby_birth_date,
                 baby_avatar, interests, content_style, wants_specialist_access,
                 onboarding_completed, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                name = excluded.name,
                birth_date = excluded.birth_date,
                previous_births = excluded.previous_births,
                baby_name = excluded.baby_name,
                baby_birth_date = excluded.baby_birth_date,
                baby_avatar = excluded.baby_avatar,
                interests = excluded.interests,
                content_style = excluded.content_style,
                wants_specialist_access = excluded.wants_specialist_access,
                onboarding_completed = excluded.onboarding_completed,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(&input.name)
        .bind(input.birth_date)
        .bind(input.previous_births)
        .bind(&input.baby_name)
        .bind(input.baby_birth_date)
        .bind(input.baby_avatar.map(|a| a.as_str()))
        .bind(&interests_json)
        .bind(input.content_style.map(|s| s.as_str()))
        .bind(input.wants_specialist_access)
        .bind(input.onboarding_completed)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to upsert profile")?;

        self.get(user_id)
            .await?
            .context("Profile missing after upsert")
    }

    async fn get(&self, user_id: i64) -> Result<Option<Profile>> {
        let row = sqlx::query("SELECT * FROM profiles WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get profile")?;

        row.map(|r| row_to_profile(&r)).transpose()
    }
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<Profile> {
    let interests_json: String = row.get("interests");
    let interest_names: Vec<String> =
        serde_json::from_str(&interests_json).context("Failed to parse interests")?;
    let interests = interest_names
        .iter()
        .filter_map(|s| Interest::parse(s))
        .collect();

    Ok(Profile {
        user_id: row.get("user_id"),
        name: row.get("name"),
        birth_date: row.get("birth_date"),
        previous_births: row.get("previous_births"),
        baby_name: row.get("baby_name"),
        baby_birth_date: row.get("baby_birth_date"),
        baby_avatar: row
            .get::<Option<String>, _>("baby_avatar")
            .as_deref()
            .and_then(BabyAvatar::parse),
        interests,
        content_style: row
            .get::<Option<String>, _>("content_style")
            .as_deref()
            .and_then(ContentStyle::parse),
        wants_specialist_access: row.get("wants_specialist_access"),
        onboarding_completed: row.get("onboarding_completed"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
