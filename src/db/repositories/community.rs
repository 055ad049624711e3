//! Community repository
//!
//! Feed rows are produced by one aggregated query: comment and reaction
//! counts come from subselects and the viewer's own reaction/bookmark
//! state from EXISTS checks, so a page of posts costs a single round
//! trip. Reaction and bookmark toggles run create-if-absent /
//! delete-if-present inside a transaction, backed by the schema's
//! UNIQUE constraints.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{
    CommunityCategory, CommunityComment, CommunityPost, CommunityPostWithMeta,
    CreateCommentInput, CreateCommunityPostInput, ListParams, PagedResult,
};

/// Filters for the community feed
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedFilter {
    /// Restrict to one category
    pub category: Option<CommunityCategory>,
    /// Signed-in viewer, used for the reacted/saved flags
    pub viewer_id: Option<i64>,
}

/// Community repository trait
#[async_trait]
pub trait CommunityRepository: Send + Sync {
    /// Create a community post
    async fn create_post(
        &self,
        author_id: i64,
        input: CreateCommunityPostInput,
    ) -> Result<CommunityPost>;

    /// Get one post with its derived counts and viewer state
    async fn get_post(
        &self,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Option<CommunityPostWithMeta>>;

    /// List the feed, newest first, with counts and viewer state
    async fn list_feed(
        &self,
        filter: &FeedFilter,
        params: &ListParams,
    ) -> Result<PagedResult<CommunityPostWithMeta>>;

    /// Delete a post owned by the given author
    async fn delete_post(&self, id: i64, author_id: i64) -> Result<bool>;

    /// Add a comment to a post
    async fn create_comment(
        &self,
        author_id: i64,
        input: CreateCommentInput,
    ) -> Result<CommunityComment>;

    /// List a post's comments, oldest first
    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommunityComment>>;

    /// Count a post's comments
    async fn comment_count(&self, post_id: i64) -> Result<i64>;

    /// Toggle the user's reaction on a post; returns true when the
    /// reaction is now present
    async fn toggle_reaction(&self, post_id: i64, user_id: i64) -> Result<bool>;

    /// Toggle the user's bookmark on a post; returns true when the
    /// bookmark is now present
    async fn toggle_save(&self, post_id: i64, user_id: i64) -> Result<bool>;

    /// List posts the user has bookmarked, newest first
    async fn list_saved(
        &self,
        user_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<CommunityPostWithMeta>>;
}

/// SQLx-based community repository
pub struct SqlxCommunityRepository {
    pool: DbPool,
}

impl SqlxCommunityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn CommunityRepository> {
        Arc::new(Self::new(pool))
    }
}

/// Shared SELECT for feed rows: post columns plus derived counts and the
/// viewer's own state, all in one statement.
const FEED_SELECT: &str = r#"
    SELECT p.*,
           pr.name AS author_profile_name,
           (SELECT COUNT(*) FROM community_comments c WHERE c.post_id = p.id) AS comment_count,
           (SELECT COUNT(*) FROM community_reactions r WHERE r.post_id = p.id) AS reaction_count,
           EXISTS(SELECT 1 FROM community_reactions r
                  WHERE r.post_id = p.id AND r.user_id = ?) AS viewer_reacted,
           EXISTS(SELECT 1 FROM saved_posts s
                  WHERE s.post_id = p.id AND s.user_id = ?) AS viewer_saved
    FROM community_posts p
    LEFT JOIN profiles pr ON pr.user_id = p.author_id
"#;

#[async_trait]
impl CommunityRepository for SqlxCommunityRepository {
    async fn create_post(
        &self,
        author_id: i64,
        input: CreateCommunityPostInput,
    ) -> Result<CommunityPost> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO community_posts
                (author_id, category, content, anonymous, allow_private_messages, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(author_id)
        .bind(input.category.as_str())
        .bind(&input.content)
        .bind(input.anonymous)
        .bind(input.allow_private_messages)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create community post")?;

        Ok(CommunityPost {
            id: result.last_insert_rowid(),
            author_id: Some(author_id),
            category: input.category,
            content: input.content,
            anonymous: input.anonymous,
            allow_private_messages: input.allow_private_messages,
            created_at: now,
        })
    }

    async fn get_post(
        &self,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Option<CommunityPostWithMeta>> {
        let sql = format!("{} WHERE p.id = ?", FEED_SELECT);
        let row = sqlx::query(&sql)
            .bind(viewer_id)
            .bind(viewer_id)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get community post")?;

        row.map(|r| row_to_post_with_meta(&r)).transpose()
    }

    async fn list_feed(
        &self,
        filter: &FeedFilter,
        params: &ListParams,
    ) -> Result<PagedResult<CommunityPostWithMeta>> {
        let (where_clause, count_sql) = match filter.category {
            Some(_) => (
                "WHERE p.category = ?",
                "SELECT COUNT(*) FROM community_posts p WHERE p.category = ?",
            ),
            None => ("", "SELECT COUNT(*) FROM community_posts p"),
        };

        let mut count_query = sqlx::query_scalar::<_, i64>(count_sql);
        if let Some(category) = filter.category {
            count_query = count_query.bind(category.as_str());
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count community posts")?;

        let sql = format!(
            "{} {} ORDER BY p.created_at DESC LIMIT ? OFFSET ?",
            FEED_SELECT, where_clause
        );
        let mut query = sqlx::query(&sql).bind(filter.viewer_id).bind(filter.viewer_id);
        if let Some(category) = filter.category {
            query = query.bind(category.as_str());
        }
        let rows = query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list community feed")?;

        let items = rows
            .iter()
            .map(row_to_post_with_meta)
            .collect::<Result<Vec<_>>>()?;

        Ok(PagedResult::new(items, total, params))
    }

    async fn delete_post(&self, id: i64, author_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM community_posts WHERE id = ? AND author_id = ?")
            .bind(id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete community post")?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_comment(
        &self,
        author_id: i64,
        input: CreateCommentInput,
    ) -> Result<CommunityComment> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO community_comments (post_id, author_id, content, anonymous, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(input.post_id)
        .bind(author_id)
        .bind(&input.content)
        .bind(input.anonymous)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create comment")?;

        Ok(CommunityComment {
            id: result.last_insert_rowid(),
            post_id: input.post_id,
            author_id: Some(author_id),
            content: input.content,
            anonymous: input.anonymous,
            created_at: now,
        })
    }

    async fn list_comments(&self, post_id: i64) -> Result<Vec<CommunityComment>> {
        let rows = sqlx::query(
            "SELECT * FROM community_comments WHERE post_id = ? ORDER BY created_at ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments")?;

        Ok(rows
            .iter()
            .map(|r| CommunityComment {
                id: r.get("id"),
                post_id: r.get("post_id"),
                author_id: r.get("author_id"),
                content: r.get("content"),
                anonymous: r.get("anonymous"),
                created_at: r.get("created_at"),
            })
            .collect())
    }

    async fn comment_count(&self, post_id: i64) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM community_comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count comments")
    }

    async fn toggle_reaction(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin reaction toggle")?;

        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM community_reactions WHERE post_id = ? AND user_id = ?",
        )
        .bind(post_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to check reaction")?;

        let now_reacted = match existing {
            Some(id) => {
                sqlx::query("DELETE FROM community_reactions WHERE id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to remove reaction")?;
                false
            }
            None => {
                sqlx::query(
                    "INSERT INTO community_reactions (post_id, user_id, created_at) VALUES (?, ?, ?)",
                )
                .bind(post_id)
                .bind(user_id)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await
                .context("Failed to add reaction")?;
                true
            }
        };

        tx.commit().await.context("Failed to commit reaction toggle")?;
        Ok(now_reacted)
    }

    async fn toggle_save(&self, post_id: i64, user_id: i64) -> Result<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin bookmark toggle")?;

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM saved_posts WHERE post_id = ? AND user_id = ?")
                .bind(post_id)
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to check bookmark")?;

        let now_saved = match existing {
            Some(id) => {
                sqlx::query("DELETE FROM saved_posts WHERE id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to remove bookmark")?;
                false
            }
            None => {
                sqlx::query("INSERT INTO saved_posts (post_id, user_id, created_at) VALUES (?, ?, ?)")
                    .bind(post_id)
                    .bind(user_id)
                    .bind(Utc::now())
                    .execute(&mut *tx)
                    .await
                    .context("Failed to add bookmark")?;
                true
            }
        };

        tx.commit().await.context("Failed to commit bookmark toggle")?;
        Ok(now_saved)
    }

    async fn list_saved(
        &self,
        user_id: i64,
        params: &ListParams,
    ) -> Result<PagedResult<CommunityPostWithMeta>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM saved_posts WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .context("Failed to count bookmarks")?;

        let sql = format!(
            r#"{} JOIN saved_posts sp ON sp.post_id = p.id AND sp.user_id = ?
               ORDER BY sp.created_at DESC LIMIT ? OFFSET ?"#,
            FEED_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .bind(user_id)
            .bind(user_id)
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list bookmarks")?;

        let items = rows
            .iter()
            .map(row_to_post_with_meta)
            .collect::<Result<Vec<_>>>()?;

        Ok(PagedResult::new(items, total, params))
    }
}

fn row_to_post_with_meta(row: &sqlx::sqlite::SqliteRow) -> Result<CommunityPostWithMeta> {
    let category: String = row.get("category");
    let anonymous: bool = row.get("anonymous");
    let author_name: Option<String> = if anonymous {
        None
    } else {
        row.get("author_profile_name")
    };

    Ok(CommunityPostWithMeta {
        post: CommunityPost {
            id: row.get("id"),
            author_id: row.get("author_id"),
            category: CommunityCategory::parse(&category)
                .ok_or_else(|| anyhow!("Unknown community category: {}", category))?,
            content: row.get("content"),
            anonymous,
            allow_private_messages: row.get("allow_private_messages"),
            created_at: row.get("created_at"),
        },
        author_name,
        comment_count: row.get("comment_count"),
        reaction_count: row.get("reaction_count"),
        viewer_reacted: row.get("viewer_reacted"),
        viewer_saved: row.get("viewer_saved"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::{
        ProfileRepository, SqlxProfileRepository, SqlxUserRepository, UserRepository,
    };
    use crate::models::ProfileInput;

    async fn setup() -> (DbPool, i64) {
        let pool = create_test_pool().await.unwrap();
        let users = SqlxUserRepository::new(pool.clone());
        let user = users.find_or_create_by_email("a@b.se", "sv").await.unwrap();

        let profiles = SqlxProfileRepository::new(pool.clone());
        profiles
            .upsert(
                user.id,
                ProfileInput {
                    name: "Anna".to_string(),
                    onboarding_completed: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        (pool, user.id)
    }

    fn post_input(content: &str) -> CreateCommunityPostInput {
        CreateCommunityPostInput {
            category: CommunityCategory::Sleep,
            content: content.to_string(),
            anonymous: false,
            allow_private_messages: true,
        }
    }

    #[tokio::test]
    async fn test_feed_carries_counts_and_viewer_state() {
        let (pool, user_id) = setup().await;
        let repo = SqlxCommunityRepository::new(pool);

        let post = repo.create_post(user_id, post_input("Night wakings")).await.unwrap();
        repo.create_comment(
            user_id,
            CreateCommentInput {
                post_id: post.id,
                content: "Same here".to_string(),
                anonymous: false,
            },
        )
        .await
        .unwrap();
        repo.toggle_reaction(post.id, user_id).await.unwrap();

        let filter = FeedFilter {
            viewer_id: Some(user_id),
            ..Default::default()
        };
        let feed = repo.list_feed(&filter, &ListParams::default()).await.unwrap();
        assert_eq!(feed.total, 1);

        let row = &feed.items[0];
        assert_eq!(row.comment_count, 1);
        assert_eq!(row.reaction_count, 1);
        assert!(row.viewer_reacted);
        assert!(!row.viewer_saved);
        assert_eq!(row.author_name.as_deref(), Some("Anna"));
    }

    #[tokio::test]
    async fn test_anonymous_post_hides_author_name() {
        let (pool, user_id) = setup().await;
        let repo = SqlxCommunityRepository::new(pool);

        let mut input = post_input("Keeping this private");
        input.anonymous = true;
        let post = repo.create_post(user_id, input).await.unwrap();

        let loaded = repo.get_post(post.id, None).await.unwrap().unwrap();
        assert!(loaded.author_name.is_none());
        assert!(loaded.post.anonymous);
    }

    #[tokio::test]
    async fn test_double_toggle_restores_original_state() {
        let (pool, user_id) = setup().await;
        let repo = SqlxCommunityRepository::new(pool);

        let post = repo.create_post(user_id, post_input("React to me")).await.unwrap();

        assert!(repo.toggle_reaction(post.id, user_id).await.unwrap());
        assert!(!repo.toggle_reaction(post.id, user_id).await.unwrap());

        let loaded = repo.get_post(post.id, Some(user_id)).await.unwrap().unwrap();
        assert_eq!(loaded.reaction_count, 0);
        assert!(!loaded.viewer_reacted);
    }

    #[tokio::test]
    async fn test_comment_count_is_fresh_after_create() {
        let (pool, user_id) = setup().await;
        let repo = SqlxCommunityRepository::new(pool);

        let post = repo.create_post(user_id, post_input("Count me")).await.unwrap();
        assert_eq!(repo.comment_count(post.id).await.unwrap(), 0);

        repo.create_comment(
            user_id,
            CreateCommentInput {
                post_id: post.id,
                content: "First".to_string(),
                anonymous: false,
            },
        )
        .await
        .unwrap();

        assert_eq!(repo.comment_count(post.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_saved_posts_toggle_and_list() {
        let (pool, user_id) = setup().await;
        let repo = SqlxCommunityRepository::new(pool);

        let post = repo.create_post(user_id, post_input("Bookmark me")).await.unwrap();

        assert!(repo.toggle_save(post.id, user_id).await.unwrap());
        let saved = repo.list_saved(user_id, &ListParams::default()).await.unwrap();
        assert_eq!(saved.total, 1);
        assert!(saved.items[0].viewer_saved);

        assert!(!repo.toggle_save(post.id, user_id).await.unwrap());
        let saved = repo.list_saved(user_id, &ListParams::default()).await.unwrap();
        assert_eq!(saved.total, 0);
    }

    #[tokio::test]
    async fn test_delete_post_requires_author() {
        let (pool, user_id) = setup().await;
        let repo = SqlxCommunityRepository::new(pool);

        let post = repo.create_post(user_id, post_input("Mine")).await.unwrap();
        assert!(!repo.delete_post(post.id, user_id + 1).await.unwrap());
        assert!(repo.delete_post(post.id, user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_feed_category_filter() {
        let (pool, user_id) = setup().await;
        let repo = SqlxCommunityRepository::new(pool);

        repo.create_post(user_id, post_input("Sleep post")).await.unwrap();
        repo.create_post(
            user_id,
            CreateCommunityPostInput {
                category: CommunityCategory::Recovery,
                content: "Recovery post".to_string(),
                anonymous: false,
                allow_private_messages: true,
            },
        )
        .await
        .unwrap();

        let filter = FeedFilter {
            category: Some(CommunityCategory::Recovery),
            viewer_id: None,
        };
        let feed = repo.list_feed(&filter, &ListParams::default()).await.unwrap();
        assert_eq!(feed.total, 1);
        assert_eq!(feed.items[0].post.content, "Recovery post");
    }
}
