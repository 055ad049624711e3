//! Auth API endpoints

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::SESSION_TTL_DAYS;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(default)]
    pub locale: Option<String>,
}

/// Request a sign-in link
pub async fn request_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let locale = req
        .locale
        .unwrap_or_else(|| state.config.site.default_locale.clone());
    state.auth_service.request_login(&req.email, &locale).await?;

    // Same response whether or not the address is registered
    Ok(Json(json!({
        "message": "If the address is valid, a sign-in link has been sent"
    })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    pub token: String,
}

/// Redeem a sign-in link: sets the session cookie and redirects into the app
pub async fn verify(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Result<Response, ApiError> {
    let login = state.auth_service.verify(&params.token).await?;

    let cookie = format!(
        "session={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        login.session.id,
        SESSION_TTL_DAYS * 24 * 3600
    );

    let response = Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(header::LOCATION, login.redirect_path.as_str())
        .header(header::SET_COOKIE, cookie)
        .body(axum::body::Body::empty())
        .map_err(|e| ApiError::internal_error(e.to_string()))?;
    Ok(response)
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub email: String,
    pub locale: String,
    pub onboarding_completed: bool,
}

/// Current user, with the server-side onboarding flag
pub async fn me(
    State(state): State<AppState>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<Json<MeResponse>, ApiError> {
    let onboarding_completed = state
        .profile_service
        .has_completed_onboarding(user.id)
        .await?;

    Ok(Json(MeResponse {
        id: user.id,
        email: user.email,
        locale: user.locale,
        onboarding_completed,
    }))
}

/// Sign out the current session
pub async fn logout(
    State(state): State<AppState>,
    request: axum::extract::Request,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                state.auth_service.logout(token).await?;
            }
        }
    } else if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                if let Some(token) = cookie.trim().strip_prefix("session=") {
                    state.auth_service.logout(token).await?;
                }
            }
        }
    }

    // Expire the cookie either way
    Ok((
        [(
            header::SET_COOKIE,
            "session=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax",
        )],
        Json(json!({ "message": "Signed out" })),
    ))
}
