//! API middleware
//!
//! Shared application state, the JSON error envelope, and the session
//! authentication middleware. A valid session is the only authorization
//! gate; there are no roles.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::models::User;
use crate::services::{
    AuthError, AuthService, CalendarService, CommunityService, OutreachService, PostService,
    ProfileService, ServiceError, TrackingService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: Arc<AuthService>,
    pub post_service: Arc<PostService>,
    pub profile_service: Arc<ProfileService>,
    pub community_service: Arc<CommunityService>,
    pub calendar_service: Arc<CalendarService>,
    pub tracking_service: Arc<TrackingService>,
    pub outreach_service: Arc<OutreachService>,
}

/// Authenticated user extracted from the request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Error response envelope
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::validation_error(e.to_string()),
            ServiceError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            ServiceError::InvalidRange => ApiError::validation_error("invalid time range"),
            ServiceError::Internal(e) => {
                tracing::error!(error = %e, "Request failed");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(e) => ApiError::validation_error(e.to_string()),
            AuthError::InvalidToken => {
                ApiError::unauthorized("Sign-in link is invalid or has expired")
            }
            AuthError::InvalidSession => ApiError::unauthorized("Invalid or expired session"),
            AuthError::Internal(e) => {
                tracing::error!(error = %e, "Auth request failed");
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = %err, "Request failed");
        ApiError::internal_error("Internal server error")
    }
}

/// Extract the session token from Authorization or cookie
fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                if let Some(token) = cookie.trim().strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware for protected routes
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state.auth_service.validate_session(&token).await?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Attaches the user when a valid session is present, anonymous otherwise
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_session_token(&request) {
        if let Ok(user) = state.auth_service.validate_session(&token).await {
            request.extensions_mut().insert(AuthenticatedUser(user));
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_extract_session_token_from_bearer() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer token-123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_session_token(&request), Some("token-123".to_string()));
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let request = Request::builder()
            .uri("/test")
            .header(header::COOKIE, "theme=dark; session=token-456")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_session_token(&request), Some("token-456".to_string()));
    }

    #[test]
    fn test_bearer_takes_priority_over_cookie() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer bearer-token")
            .header(header::COOKIE, "session=cookie-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            extract_session_token(&request),
            Some("bearer-token".to_string())
        );
    }

    #[test]
    fn test_missing_token() {
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert!(extract_session_token(&request).is_none());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::unauthorized("x").error.code, "UNAUTHORIZED");
        assert_eq!(ApiError::not_found("x").error.code, "NOT_FOUND");
        assert_eq!(
            ApiError::validation_error("x").error.code,
            "VALIDATION_ERROR"
        );
    }
}
