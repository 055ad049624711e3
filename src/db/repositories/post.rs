//! Editorial post repository

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use std::sync::Arc;

use crate::db::DbPool;
use crate::models::{CreatePostInput, ListParams, PagedResult, Post, PostCategory, UpdatePostInput};

/// Filters for listing posts
#[derive(Debug, Clone, Default)]
pub struct PostListFilter {
    /// Restrict to one category
    pub category: Option<PostCategory>,
    /// Case-insensitive substring match on title and content
    pub search: Option<String>,
    /// Restrict to one language tag
    pub language: Option<String>,
    /// Only rows with published = true (end-user views)
    pub published_only: bool,
}

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a post
    async fn create(&self, input: CreatePostInput, default_language: &str) -> Result<Post>;

    /// Get a post by id
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// List posts matching a filter, newest first
    async fn list(&self, filter: &PostListFilter, params: &ListParams) -> Result<PagedResult<Post>>;

    /// Apply a partial update; returns the updated post if it existed
    async fn update(&self, id: i64, input: UpdatePostInput) -> Result<Option<Post>>;

    /// Delete a post
    async fn delete(&self, id: i64) -> Result<bool>;
}

/// SQLx-based post repository
pub struct SqlxPostRepository {
    pool: DbPool,
}

impl SqlxPostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn boxed(pool: DbPool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, input: CreatePostInput, default_language: &str) -> Result<Post> {
        let now = Utc::now();
        let published = input.published.unwrap_or(false);
        let language = input
            .language
            .clone()
            .unwrap_or_else(|| default_language.to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO posts
                (title, content, author, category, image_url, audio_url,
                 introduction, practical_tip, published, language, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.author)
        .bind(input.category.as_str())
        .bind(&input.image_url)
        .bind(&input.audio_url)
        .bind(&input.introduction)
        .bind(&input.practical_tip)
        .bind(published)
        .bind(&language)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create post")?;

        Ok(Post {
            id: result.last_insert_rowid(),
            title: input.title,
            content: input.content,
            author: input.author,
            category: input.category,
            image_url: input.image_url,
            audio_url: input.audio_url,
            introduction: input.introduction,
            practical_tip: input.practical_tip,
            published,
            language,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get post")?;

        row.map(|r| row_to_post(&r)).transpose()
    }

    async fn list(&self, filter: &PostListFilter, params: &ListParams) -> Result<PagedResult<Post>> {
        let mut conditions: Vec<String> = Vec::new();
        if filter.published_only {
            conditions.push("published = 1".to_string());
        }
        if filter.category.is_some() {
            conditions.push("category = ?".to_string());
        }
        if filter.search.is_some() {
            conditions.push("(title LIKE ? OR content LIKE ?)".to_string());
        }
        if filter.language.is_some() {
            conditions.push("language = ?".to_string());
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let search_pattern = filter.search.as_ref().map(|s| format!("%{}%", s));

        let count_sql = format!("SELECT COUNT(*) FROM posts {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(category) = filter.category {
            count_query = count_query.bind(category.as_str());
        }
        if let Some(ref pattern) = search_pattern {
            count_query = count_query.bind(pattern).bind(pattern);
        }
        if let Some(ref language) = filter.language {
            count_query = count_query.bind(language);
        }
        let total = count_query
            .fetch_one(&self.pool)
            .await
            .context("Failed to count posts")?;

        let list_sql = format!(
            "SELECT * FROM posts {} ORDER BY created_at DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut list_query = sqlx::query(&list_sql);
        if let Some(category) = filter.category {
            list_query = list_query.bind(category.as_str());
        }
        if let Some(ref pattern) = search_pattern {
            list_query = list_query.bind(pattern).bind(pattern);
        }
        if let Some(ref language) = filter.language {
            list_query = list_query.bind(language);
        }
        let rows = list_query
            .bind(params.limit())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list posts")?;

        let items = rows
            .iter()
            .map(row_to_post)
            .collect::<Result<Vec<_>>>()?;

        Ok(PagedResult::new(items, total, params))
    }

    async fn update(&self, id: i64, input: UpdatePostInput) -> Result<Option<Post>> {
        let Some(mut post) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        if !input.has_changes() {
            return Ok(Some(post));
        }

        if let Some(title) = input.title {
            post.title = title;
        }
        if let Some(content) = input.content {
            post.content = content;
        }
        if let Some(author) = input.author {
            post.author = author;
        }
        if let Some(category) = input.category {
            post.category = category;
        }
        if let Some(image_url) = input.image_url {
            post.image_url = Some(image_url);
        }
        if let Some(audio_url) = input.audio_url {
            post.audio_url = Some(audio_url);
        }
        if let Some(introduction) = input.introduction {
            post.introduction = Some(introduction);
        }
        if let Some(practical_tip) = input.practical_tip {
            post.practical_tip = Some(practical_tip);
        }
        if let Some(published) = input.published {
            post.published = published;
        }
        if let Some(language) = input.language {
            post.language = language;
        }
        post.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE posts SET
                title = ?, content = ?, author = ?, category = ?, image_url = ?,
                audio_url = ?, introduction = ?, practical_tip = ?, published = ?,
                language = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.content)
        .bind(&post.author)
        .bind(post.category.as_str())
        .bind(&post.image_url)
        .bind(&post.audio_url)
        .bind(&post.introduction)
        .bind(&post.practical_tip)
        .bind(post.published)
        .bind(&post.language)
        .bind(post.updated_at)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update post")?;

        Ok(Some(post))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete post")?;
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_post(row: &sqlx::sqlite::SqliteRow) -> Result<Post> {
    let category: String = row.get("category");
    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("content"),
        author: row.get("author"),
        category: PostCategory::parse(&category)
            .ok_or_else(|| anyhow!("Unknown post category: {}", category))?,
        image_url: row.get("image_url"),
        audio_url: row.get("audio_url"),
        introduction: row.get("introduction"),
        practical_tip: row.get("practical_tip"),
        published: row.get("published"),
        language: row.get("language"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
