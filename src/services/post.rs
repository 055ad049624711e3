//! Editorial post service
//!
//! Read paths go through the query cache; every write invalidates the
//! whole `posts` namespace so stale lists can never outlive a mutation.

use anyhow::Result;
use std::sync::Arc;

use crate::cache::{query_key, QueryCache};
use crate::db::repositories::{FeedbackRepository, PostListFilter, PostRepository};
use crate::models::{
    CreatePostInput, FeedbackStats, ListParams, PagedResult, Post, UpdatePostInput,
};
use crate::services::validation::validate_post_input;
use crate::services::ServiceError;

const ENTITY: &str = "posts";

pub struct PostService {
    repo: Arc<dyn PostRepository>,
    feedback: Arc<dyn FeedbackRepository>,
    cache: Arc<QueryCache>,
    default_language: String,
}

impl PostService {
    pub fn new(
        repo: Arc<dyn PostRepository>,
        feedback: Arc<dyn FeedbackRepository>,
        cache: Arc<QueryCache>,
        default_language: String,
    ) -> Self {
        Self {
            repo,
            feedback,
            cache,
            default_language,
        }
    }

    pub async fn create(&self, input: CreatePostInput) -> Result<Post, ServiceError> {
        validate_post_input(&input)?;
        let post = self.repo.create(input, &self.default_language).await?;
        self.cache.invalidate_entity(ENTITY).await;
        Ok(post)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Post>> {
        let key = query_key(ENTITY, "detail", &id)?;
        self.cache
            .get_or_fetch(&key, || async { self.repo.get_by_id(id).await })
            .await
    }

    pub async fn list(
        &self,
        filter: PostListFilter,
        params: ListParams,
    ) -> Result<PagedResult<Post>> {
        let key = query_key(
            ENTITY,
            "list",
            &(
                filter.category.map(|c| c.as_str()),
                filter.search.clone(),
                filter.language.clone(),
                filter.published_only,
                params.page,
                params.per_page,
            ),
        )?;
        self.cache
            .get_or_fetch(&key, || async { self.repo.list(&filter, &params).await })
            .await
    }

    pub async fn update(&self, id: i64, input: UpdatePostInput) -> Result<Option<Post>> {
        let post = self.repo.update(id, input).await?;
        if post.is_some() {
            self.cache.invalidate_entity(ENTITY).await;
        }
        Ok(post)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let deleted = self.repo.delete(id).await?;
        if deleted {
            self.cache.invalidate_entity(ENTITY).await;
        }
        Ok(deleted)
    }

    /// Record reader feedback; stats are cheap enough to stay uncached
    pub async fn add_feedback(
        &self,
        post_id: i64,
        user_id: Option<i64>,
        was_helpful: bool,
        suggestion: Option<String>,
    ) -> Result<FeedbackStats> {
        self.feedback
            .create(post_id, user_id, was_helpful, suggestion)
            .await?;
        self.feedback.stats(post_id).await
    }

    pub async fn feedback_stats(&self, post_id: i64) -> Result<FeedbackStats> {
        self.feedback.stats(post_id).await
    }
}
