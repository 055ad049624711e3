//! Calendar API endpoints
//!
//! Resolution needs the signed-in user's baby birth date, read from the
//! profile on every request; a profile without one yields empty days, not
//! an error.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{CalendarContent, WeekContent};

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub date: NaiveDate,
    pub content: Option<CalendarContent>,
}

pub async fn resolve_day(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<DayQuery>,
) -> Result<Json<DayResponse>, ApiError> {
    let birth = baby_birth_date(&state, user.id).await?;
    let content = state.calendar_service.resolve_day(birth, query.date).await?;
    Ok(Json(DayResponse {
        date: query.date,
        content,
    }))
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    /// First day of the requested week
    pub start: NaiveDate,
}

pub async fn resolve_week(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekContent>, ApiError> {
    let birth = baby_birth_date(&state, user.id).await?;
    let week = state.calendar_service.resolve_week(birth, query.start).await?;
    Ok(Json(week))
}

async fn baby_birth_date(state: &AppState, user_id: i64) -> Result<Option<NaiveDate>, ApiError> {
    Ok(state
        .profile_service
        .get(user_id)
        .await?
        .and_then(|p| p.baby_birth_date))
}
