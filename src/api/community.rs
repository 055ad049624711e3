//! Community forum API endpoints

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::db::repositories::FeedFilter;
use crate::models::{
    CommunityCategory, CommunityComment, CommunityPost, CommunityPostWithMeta, CreateCommentInput,
    CreateCommunityPostInput, ListParams, PagedResult,
};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Community feed with per-post counts and viewer state
pub async fn list_feed(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<PagedResult<CommunityPostWithMeta>>, ApiError> {
    let category = match query.category.as_deref() {
        None => None,
        Some(raw) => Some(CommunityCategory::parse(raw).ok_or_else(|| {
            ApiError::validation_error(format!("Unknown category: {}", raw))
        })?),
    };

    let filter = FeedFilter {
        category,
        viewer_id: user.map(|Extension(AuthenticatedUser(u))| u.id),
    };
    let params = ListParams::new(query.page.unwrap_or(1), query.per_page.unwrap_or(20));
    let result = state.community_service.list_feed(filter, params).await?;
    Ok(Json(result))
}

pub async fn get_post(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Path(id): Path<i64>,
) -> Result<Json<CommunityPostWithMeta>, ApiError> {
    let viewer_id = user.map(|Extension(AuthenticatedUser(u))| u.id);
    let post = state
        .community_service
        .get_post(id, viewer_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;
    Ok(Json(post))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(input): Json<CreateCommunityPostInput>,
) -> Result<Json<CommunityPost>, ApiError> {
    let post = state.community_service.create_post(user.id, input).await?;
    Ok(Json(post))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.community_service.delete_post(id, user.id).await? {
        return Err(ApiError::not_found("Post not found"));
    }
    Ok(Json(json!({ "deleted": true })))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<CommunityComment>>, ApiError> {
    Ok(Json(state.community_service.list_comments(id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
    #[serde(default)]
    pub anonymous: bool,
}

pub async fn create_comment(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<CommunityComment>, ApiError> {
    let input = CreateCommentInput {
        post_id: id,
        content: req.content,
        anonymous: req.anonymous,
    };
    let comment = state.community_service.create_comment(user.id, input).await?;
    Ok(Json(comment))
}

/// Toggle the viewer's reaction on a post
pub async fn toggle_reaction(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let reacted = state.community_service.toggle_reaction(id, user.id).await?;
    Ok(Json(json!({ "reacted": reacted })))
}

/// Toggle the viewer's bookmark on a post
pub async fn toggle_save(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let saved = state.community_service.toggle_save(id, user.id).await?;
    Ok(Json(json!({ "saved": saved })))
}

#[derive(Debug, Deserialize)]
pub struct SavedQuery {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

pub async fn list_saved(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<SavedQuery>,
) -> Result<Json<PagedResult<CommunityPostWithMeta>>, ApiError> {
    let params = ListParams::new(query.page.unwrap_or(1), query.per_page.unwrap_or(20));
    let result = state.community_service.list_saved(user.id, params).await?;
    Ok(Json(result))
}
