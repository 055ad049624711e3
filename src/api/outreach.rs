//! Marketing-page API endpoints

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

pub async fn subscribe(
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.outreach_service.subscribe(&req.email).await?;
    Ok(Json(json!({ "subscribed": true })))
}

#[derive(Debug, Deserialize)]
pub struct ReferralRequest {
    pub referrer_email: String,
    pub referred_email: String,
}

pub async fn refer(
    State(state): State<AppState>,
    Json(req): Json<ReferralRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = state
        .outreach_service
        .refer(&req.referrer_email, &req.referred_email)
        .await?;
    Ok(Json(json!({ "referral_count": count })))
}

#[derive(Debug, Deserialize)]
pub struct WaitlistRequest {
    pub email: String,
    pub feature: String,
}

pub async fn join_waitlist(
    State(state): State<AppState>,
    Json(req): Json<WaitlistRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .outreach_service
        .join_waitlist(&req.email, &req.feature)
        .await?;
    Ok(Json(json!({ "joined": true })))
}
