//! Profile API endpoints

use axum::{extract::State, Extension, Json};
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Profile, ProfileInput};

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state
        .profile_service
        .get(user.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;
    Ok(Json(profile))
}

/// Create or replace the profile; the onboarding flow finishes here
pub async fn save_profile(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(input): Json<ProfileInput>,
) -> Result<Json<Profile>, ApiError> {
    let profile = state.profile_service.save(user.id, input).await?;
    Ok(Json(profile))
}

/// Skip onboarding: store the flag-only profile
pub async fn skip_onboarding(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .profile_service
        .save(user.id, ProfileInput::skipped())
        .await?;
    Ok(Json(json!({ "onboarding_completed": true })))
}
