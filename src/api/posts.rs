//! Editorial post API endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::db::repositories::PostListFilter;
use crate::models::{
    CreatePostInput, FeedbackStats, ListParams, PagedResult, Post, PostCategory, UpdatePostInput,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl ListQuery {
    fn params(&self) -> ListParams {
        ListParams::new(self.page.unwrap_or(1), self.per_page.unwrap_or(20))
    }

    fn category(&self) -> Result<Option<PostCategory>, ApiError> {
        match self.category.as_deref() {
            None => Ok(None),
            Some(raw) => PostCategory::parse(raw)
                .map(Some)
                .ok_or_else(|| ApiError::validation_error(format!("Unknown category: {}", raw))),
        }
    }
}

/// List published posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PagedResult<Post>>, ApiError> {
    let filter = PostListFilter {
        category: query.category()?,
        search: query.search.clone(),
        language: query.language.clone(),
        published_only: true,
    };
    let result = state.post_service.list(filter, query.params()).await?;
    Ok(Json(result))
}

/// List all posts, drafts included (editorial view)
pub async fn list_all_posts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PagedResult<Post>>, ApiError> {
    let filter = PostListFilter {
        category: query.category()?,
        search: query.search.clone(),
        language: query.language.clone(),
        published_only: false,
    };
    let result = state.post_service.list(filter, query.params()).await?;
    Ok(Json(result))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .post_service
        .get(id)
        .await?
        .filter(|p| p.published)
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    Ok(Json(post))
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> Result<Json<Post>, ApiError> {
    let post = state.post_service.create(input).await?;
    Ok(Json(post))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdatePostInput>,
) -> Result<Json<Post>, ApiError> {
    let post = state
        .post_service
        .update(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.post_service.delete(id).await? {
        return Err(ApiError::not_found("Post not found"));
    }
    Ok(Json(json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub was_helpful: bool,
    #[serde(default)]
    pub suggestion: Option<String>,
}

/// Record reader feedback; works signed-in or anonymous
pub async fn add_feedback(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: Option<Extension<AuthenticatedUser>>,
    Json(req): Json<FeedbackRequest>,
) -> Result<Json<FeedbackStats>, ApiError> {
    if state.post_service.get(id).await?.is_none() {
        return Err(ApiError::not_found("Post not found"));
    }
    let user_id = user.map(|Extension(AuthenticatedUser(u))| u.id);
    let stats = state
        .post_service
        .add_feedback(id, user_id, req.was_helpful, req.suggestion)
        .await?;
    Ok(Json(stats))
}

pub async fn feedback_stats(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FeedbackStats>, ApiError> {
    Ok(Json(state.post_service.feedback_stats(id).await?))
}
