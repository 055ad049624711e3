//! User and login-token repositories
//!
//! Users are created lazily on first successful magic-link verification,
//! so the only write paths are find-or-create and the last-login touch.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{LoginToken, User};

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Get an existing user by email or create one
    async fn find_or_create_by_email(&self, email: &str, locale: &str) -> Result<User>;

    /// Get a user by id
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Record a successful sign-in
    async fn touch_last_login(&self, id: i64) -> Result<()>;
}

/// SQLx-based user repository
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn find_or_create_by_email(&self, email: &str, locale: &str) -> Result<User> {
        let email = email.to_lowercase();

        if let Some(user) = get_by_email(&self.pool, &email).await? {
            return Ok(user);
        }

        let now = Utc::now();
        let result = sqlx::query("INSERT INTO users (email, locale, created_at) VALUES (?, ?, ?)")
            .bind(&email)
            .bind(locale)
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to create user")?;

        Ok(User {
            id: result.last_insert_rowid(),
            email,
            locale: locale.to_string(),
            created_at: now,
            last_login_at: None,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by id")?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn touch_last_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update last login")?;
        Ok(())
    }
}

async fn get_by_email(pool: &DbPool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by email")?;

    Ok(row.map(|r| row_to_user(&r)))
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        email: row.get("email"),
        locale: row.get("locale"),
        created_at: row.get("created_at"),
        last_login_at: row.get("last_login_at"),
    }
}

/// Login-token repository trait
#[async_trait]
pub trait LoginTokenRepository: Send + Sync {
    /// Store a pending token
    async fn create(&self, token: &LoginToken) -> Result<()>;

    /// Atomically consume a redeemable token by hash.
    ///
    /// Returns the token record if it existed, was unused, and had not
    /// expired; marks it used in the same statement so a token can never
    /// be redeemed twice.
    async fn consume(&self, token_hash: &str) -> Result<Option<LoginToken>>;

    /// Delete expired tokens, returning how many were removed
    async fn delete_expired(&self) -> Result<u64>;
}

/// SQLx-based login-token repository
pub struct SqlxLoginTokenRepository {
    pool: DbPool,
}

impl SqlxLoginTokenRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn LoginTokenRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LoginTokenRepository for SqlxLoginTokenRepository {
    async fn create(&self, token: &LoginToken) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO login_tokens (token_hash, email, locale, expires_at, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&token.token_hash)
        .bind(&token.email)
        .bind(&token.locale)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to store login token")?;
        Ok(())
    }

    async fn consume(&self, token_hash: &str) -> Result<Option<LoginToken>> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE login_tokens
            SET used_at = ?
            WHERE token_hash = ? AND used_at IS NULL AND expires_at > ?
            "#,
        )
        .bind(now)
        .bind(token_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to consume login token")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query("SELECT * FROM login_tokens WHERE token_hash = ?")
            .bind(token_hash)
            .fetch_one(&self.pool)
            .await
            .context("Failed to read consumed login token")?;

        Ok(Some(LoginToken {
            token_hash: row.get("token_hash"),
            email: row.get("email"),
            locale: row.get("locale"),
            expires_at: row.get("expires_at"),
            used_at: row.get::<Option<DateTime<Utc>>, _>("used_at"),
            created_at: row.get("created_at"),
        }))
    }

    async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM login_tokens WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired login tokens")?;
        Ok(result.rows_affected())
    }
}
