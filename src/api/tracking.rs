//! Tracking API endpoints
//!
//! Timer sessions, elimination diary entries, and the printable weekly
//! reports built from them.

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{
    BreastfeedingSession, CreateEliminationInput, CreateSessionInput, EliminationEntry,
};
use crate::services::report;
use crate::services::tracking::{SignalOption, SIGNAL_OPTIONS};

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

pub async fn record_session(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(input): Json<CreateSessionInput>,
) -> Result<Json<BreastfeedingSession>, ApiError> {
    let session = state.tracking_service.record_session(user.id, input).await?;
    Ok(Json(session))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<BreastfeedingSession>>, ApiError> {
    let sessions = state
        .tracking_service
        .list_sessions(user.id, range.from, range.to)
        .await?;
    Ok(Json(sessions))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.tracking_service.delete_session(id, user.id).await? {
        return Err(ApiError::not_found("Session not found"));
    }
    Ok(Json(json!({ "deleted": true })))
}

pub async fn record_elimination(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Json(input): Json<CreateEliminationInput>,
) -> Result<Json<EliminationEntry>, ApiError> {
    let entry = state
        .tracking_service
        .record_elimination(user.id, input)
        .await?;
    Ok(Json(entry))
}

pub async fn list_eliminations(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<EliminationEntry>>, ApiError> {
    let entries = state
        .tracking_service
        .list_eliminations(user.id, range.from, range.to)
        .await?;
    Ok(Json(entries))
}

pub async fn delete_elimination(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.tracking_service.delete_elimination(id, user.id).await? {
        return Err(ApiError::not_found("Entry not found"));
    }
    Ok(Json(json!({ "deleted": true })))
}

/// Signal suggestions for the diary entry form
pub async fn signal_options() -> Json<Vec<SignalOption>> {
    Json(SIGNAL_OPTIONS.clone())
}

/// Printable weekly diary report
pub async fn diary_report(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(range): Query<RangeQuery>,
) -> Result<Html<String>, ApiError> {
    let entries = state
        .tracking_service
        .list_eliminations(user.id, range.from, range.to)
        .await?;
    let report = report::diary_report(&entries, range.from, range.to);
    Ok(Html(report::render_diary_html(&report)))
}

/// Printable weekly signal report
pub async fn signal_report(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(range): Query<RangeQuery>,
) -> Result<Html<String>, ApiError> {
    let entries = state
        .tracking_service
        .list_eliminations(user.id, range.from, range.to)
        .await?;
    let report = report::signal_report(&entries, range.from, range.to);
    Ok(Html(report::render_signal_html(&report)))
}
