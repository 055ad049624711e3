//! Community forum service
//!
//! The feed read path is cached under the `feed` namespace; any community
//! write (post, comment, reaction, bookmark) flushes it, since every one
//! of them changes the derived counts the feed rows carry.

use anyhow::Result;
use std::sync::Arc;

use crate::cache::{query_key, QueryCache};
use crate::db::repositories::{CommunityRepository, FeedFilter};
use crate::models::{
    CommunityComment, CommunityPost, CommunityPostWithMeta, CreateCommentInput,
    CreateCommunityPostInput, ListParams, PagedResult,
};
use crate::services::validation::{validate_comment, validate_community_post};
use crate::services::ServiceError;

const ENTITY: &str = "feed";

pub struct CommunityService {
    repo: Arc<dyn CommunityRepository>,
    cache: Arc<QueryCache>,
}

impl CommunityService {
    pub fn new(repo: Arc<dyn CommunityRepository>, cache: Arc<QueryCache>) -> Self {
        Self { repo, cache }
    }

    pub async fn create_post(
        &self,
        author_id: i64,
        input: CreateCommunityPostInput,
    ) -> Result<CommunityPost, ServiceError> {
        validate_community_post(&input)?;
        let post = self.repo.create_post(author_id, input).await?;
        self.cache.invalidate_entity(ENTITY).await;
        Ok(post)
    }

    pub async fn get_post(
        &self,
        id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Option<CommunityPostWithMeta>> {
        // Viewer state makes these rows per-user; not worth caching
        self.repo.get_post(id, viewer_id).await
    }

    pub async fn list_feed(
        &self,
        filter: FeedFilter,
        params: ListParams,
    ) -> Result<PagedResult<CommunityPostWithMeta>> {
        let key = query_key(
            ENTITY,
            "list",
            &(
                filter.category.map(|c| c.as_str()),
                filter.viewer_id,
                params.page,
                params.per_page,
            ),
        )?;
        self.cache
            .get_or_fetch(&key, || async { self.repo.list_feed(&filter, &params).await })
            .await
    }

    pub async fn delete_post(&self, id: i64, author_id: i64) -> Result<bool> {
        let deleted = self.repo.delete_post(id, author_id).await?;
        if deleted {
            self.cache.invalidate_entity(ENTITY).await;
        }
        Ok(deleted)
    }

    pub async fn create_comment(
        &self,
        author_id: i64,
        input: CreateCommentInput,
    ) -> Result<CommunityComment, ServiceError> {
        validate_comment(&input)?;
        if self.repo.get_post(input.post_id, None).await?.is_none() {
            return Err(ServiceError::NotFound("post"));
        }
        let comment = self.repo.create_comment(author_id, input).await?;
        self.cache.invalidate_entity(ENTITY).await;
        Ok(comment)
    }

    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<CommunityComment>> {
        self.repo.list_comments(post_id).await
    }

    pub async fn toggle_reaction(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<bool, ServiceError> {
        if self.repo.get_post(post_id, None).await?.is_none() {
            return Err(ServiceError::NotFound("post"));
        }
        let reacted = self.repo.toggle_reaction(post_id, user_id).await?;
        self.cache.invalidate_entity(ENTITY).await;
        Ok(reacted)
    }

    pub async fn toggle_save(&self, post_id: i64, user_id: i64) -> Result<bool, ServiceError> {
        if self.repo.get_post(post_id, None).await?.is_none() {
            return Err(ServiceError::NotFound("post"));
        }
        let saved = self.repo.toggle_save(post_id, user_id).await?;
        self.cache.invalidate_entity(ENTITY).await;
        Ok(saved)
    }

    pub async fn list_saved(
        &self,
        user_id: i64,
        params: ListParams,
    ) -> Result<PagedResult<CommunityPostWithMeta>> {
        self.repo.list_saved(user_id, &params).await
    }
}
