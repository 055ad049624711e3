//! Database migrations
//!
//! Code-based migrations embedded in the binary for single-binary
//! deployment. Each migration is a versioned block of SQL; applied
//! versions are recorded in `schema_migrations` and skipped on the next
//! start.

use anyhow::{Context, Result};
use sqlx::Row;

use super::DbPool;

/// A single versioned migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Unique, sequential version number
    pub version: i32,
    /// Human-readable migration name
    pub name: &'static str,
    /// SQL statements applied by this migration
    pub up: &'static str,
}

/// All migrations, in order.
pub const MIGRATIONS: &[Migration] = &[
    // Identity: users, sessions and pending magic-link tokens
    Migration {
        version: 1,
        name: "create_identity",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email VARCHAR(255) NOT NULL UNIQUE,
                locale VARCHAR(8) NOT NULL DEFAULT 'sv',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                last_login_at TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                user_id INTEGER NOT NULL,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);

            CREATE TABLE IF NOT EXISTS login_tokens (
                token_hash VARCHAR(64) PRIMARY KEY,
                email VARCHAR(255) NOT NULL,
                locale VARCHAR(8) NOT NULL DEFAULT 'sv',
                expires_at TIMESTAMP NOT NULL,
                used_at TIMESTAMP,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_login_tokens_email ON login_tokens(email);
        "#,
    },
    // Editorial posts
    Migration {
        version: 2,
        name: "create_posts",
        up: r#"
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(255) NOT NULL,
                content TEXT NOT NULL,
                author VARCHAR(100) NOT NULL,
                category VARCHAR(30) NOT NULL,
                image_url TEXT,
                audio_url TEXT,
                introduction TEXT,
                practical_tip TEXT,
                published BOOLEAN NOT NULL DEFAULT 0,
                language VARCHAR(8) NOT NULL DEFAULT 'sv',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_posts_category ON posts(category);
            CREATE INDEX IF NOT EXISTS idx_posts_published ON posts(published);
        "#,
    },
    // User profiles (one row per user, onboarding flag lives here)
    Migration {
        version: 3,
        name: "create_profiles",
        up: r#"
            CREATE TABLE IF NOT EXISTS profiles (
                user_id INTEGER PRIMARY KEY,
                name VARCHAR(100) NOT NULL DEFAULT '',
                birth_date DATE,
                previous_births INTEGER,
                baby_name VARCHAR(100),
                baby_birth_date DATE,
                baby_avatar VARCHAR(20),
                interests TEXT NOT NULL DEFAULT '[]',
                content_style VARCHAR(20),
                wants_specialist_access BOOLEAN NOT NULL DEFAULT 0,
                onboarding_completed BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
        "#,
    },
    // Community forum: posts, comments, reactions, bookmarks
    Migration {
        version: 4,
        name: "create_community",
        up: r#"
            CREATE TABLE IF NOT EXISTS community_posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER,
                category VARCHAR(30) NOT NULL,
                content TEXT NOT NULL,
                anonymous BOOLEAN NOT NULL DEFAULT 0,
                allow_private_messages BOOLEAN NOT NULL DEFAULT 1,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_community_posts_category ON community_posts(category);
            CREATE INDEX IF NOT EXISTS idx_community_posts_created_at ON community_posts(created_at);

            CREATE TABLE IF NOT EXISTS community_comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                author_id INTEGER,
                content TEXT NOT NULL,
                anonymous BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (post_id) REFERENCES community_posts(id) ON DELETE CASCADE,
                FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_community_comments_post_id ON community_comments(post_id);

            CREATE TABLE IF NOT EXISTS community_reactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (post_id) REFERENCES community_posts(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                UNIQUE (post_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS saved_posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                post_id INTEGER NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (post_id) REFERENCES community_posts(id) ON DELETE CASCADE,
                UNIQUE (user_id, post_id)
            );
        "#,
    },
    // Tracking tools: breastfeeding timer and EC diary
    Migration {
        version: 5,
        name: "create_tracking",
        up: r#"
            CREATE TABLE IF NOT EXISTS breastfeeding_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                started_at TIMESTAMP NOT NULL,
                ended_at TIMESTAMP NOT NULL,
                duration_seconds INTEGER NOT NULL,
                side VARCHAR(10) NOT NULL,
                notes TEXT,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_bf_sessions_user_started
                ON breastfeeding_sessions(user_id, started_at);

            CREATE TABLE IF NOT EXISTS elimination_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                occurred_at TIMESTAMP NOT NULL,
                elimination_type VARCHAR(10) NOT NULL,
                location VARCHAR(50) NOT NULL,
                capture_status VARCHAR(10) NOT NULL,
                signals TEXT NOT NULL DEFAULT '[]',
                notes TEXT,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_ec_entries_user_occurred
                ON elimination_entries(user_id, occurred_at);
        "#,
    },
    // Calendar content catalog
    Migration {
        version: 6,
        name: "create_calendar_contents",
        up: r#"
            CREATE TABLE IF NOT EXISTS calendar_contents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                phase VARCHAR(20) NOT NULL,
                age_min_days INTEGER NOT NULL,
                age_max_days INTEGER NOT NULL,
                week_offset INTEGER,
                day_of_week INTEGER,
                content_type VARCHAR(20) NOT NULL,
                url TEXT,
                content_data TEXT NOT NULL DEFAULT '{}',
                premium BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_calendar_contents_age
                ON calendar_contents(age_min_days, age_max_days);
        "#,
    },
    // Post feedback
    Migration {
        version: 7,
        name: "create_post_feedback",
        up: r#"
            CREATE TABLE IF NOT EXISTS post_feedback (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                user_id INTEGER,
                was_helpful BOOLEAN NOT NULL,
                suggestion TEXT,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_post_feedback_post_id ON post_feedback(post_id);
        "#,
    },
    // Marketing-page signups
    Migration {
        version: 8,
        name: "create_outreach",
        up: r#"
            CREATE TABLE IF NOT EXISTS subscribers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email VARCHAR(255) NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS referrals (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                referrer_email VARCHAR(255) NOT NULL,
                referred_email VARCHAR(255) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS waitlist_emails (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email VARCHAR(255) NOT NULL,
                feature VARCHAR(50) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                UNIQUE (email, feature)
            );
        "#,
    },
];

/// Run all pending migrations against the pool
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    create_migrations_table(pool).await?;

    let applied = applied_versions(pool).await?;

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );

        // sqlx executes one statement at a time; split the block
        for statement in split_statements(migration.up) {
            sqlx::query(&statement)
                .execute(pool)
                .await
                .with_context(|| {
                    format!("Migration {} ({}) failed", migration.version, migration.name)
                })?;
        }

        sqlx::query("INSERT INTO schema_migrations (version, name) VALUES (?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(pool)
            .await
            .context("Failed to record migration")?;
    }

    Ok(())
}

async fn create_migrations_table(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name VARCHAR(100) NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create schema_migrations table")?;
    Ok(())
}

async fn applied_versions(pool: &DbPool) -> Result<Vec<i32>> {
    let rows = sqlx::query("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read applied migrations")?;
    Ok(rows.iter().map(|r| r.get::<i32, _>("version")).collect())
}

/// Split a migration block into individual statements on ";" boundaries.
/// The schema contains no string literals with semicolons.
fn split_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::create_pool;

    async fn memory_pool() -> DbPool {
        let config = DatabaseConfig {
            url: ":memory:".to_string(),
        };
        create_pool(&config).await.unwrap()
    }

    #[test]
    fn test_versions_are_sequential() {
        for (i, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, (i + 1) as i32);
        }
    }

    #[test]
    fn test_split_statements() {
        let parts = split_statements("CREATE TABLE a (id INTEGER);\nCREATE INDEX b ON a(id);");
        assert_eq!(parts.len(), 2);
    }

    #[tokio::test]
    async fn test_migrations_apply_cleanly() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.expect("migrations failed");

        // All tables exist
        for table in [
            "users",
            "sessions",
            "login_tokens",
            "posts",
            "profiles",
            "community_posts",
            "community_comments",
            "community_reactions",
            "saved_posts",
            "breastfeeding_sessions",
            "elimination_entries",
            "calendar_contents",
            "post_feedback",
            "subscribers",
            "referrals",
            "waitlist_emails",
        ] {
            let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(&pool)
                .await
                .unwrap_or_else(|_| panic!("table {} missing", table));
            assert_eq!(count, 0);
        }
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let applied = applied_versions(&pool).await.unwrap();
        assert_eq!(applied.len(), MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_reaction_uniqueness_enforced() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();

        sqlx::query("INSERT INTO users (email) VALUES ('a@b.se')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO community_posts (author_id, category, content) VALUES (1, 'sleep', 'hi')")
            .execute(&pool)
            .await
            .unwrap();

        sqlx::query("INSERT INTO community_reactions (post_id, user_id) VALUES (1, 1)")
            .execute(&pool)
            .await
            .unwrap();
        let dup = sqlx::query("INSERT INTO community_reactions (post_id, user_id) VALUES (1, 1)")
            .execute(&pool)
            .await;
        assert!(dup.is_err());
    }
}
