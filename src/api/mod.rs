//! API layer - HTTP handlers and routing
//!
//! All endpoints live under `/api/v1`. Three tiers:
//! - public: editorial reads, auth entry points, marketing signups
//! - optional auth: community reads (viewer state when signed in)
//! - protected: everything personal, gated by session presence only

pub mod auth;
pub mod calendar;
pub mod community;
pub mod middleware;
pub mod outreach;
pub mod posts;
pub mod profiles;
pub mod tracking;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the `/api/v1` router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Personal routes: require a session
    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/profile", get(profiles::get_profile))
        .route("/profile", put(profiles::save_profile))
        .route("/profile/skip-onboarding", post(profiles::skip_onboarding))
        .route("/posts", post(posts::create_post))
        .route("/posts/all", get(posts::list_all_posts))
        .route("/posts/{id}", put(posts::update_post))
        .route("/posts/{id}", delete(posts::delete_post))
        .route("/community/posts", post(community::create_post))
        .route("/community/posts/{id}", delete(community::delete_post))
        .route("/community/posts/{id}/comments", post(community::create_comment))
        .route("/community/posts/{id}/reaction", post(community::toggle_reaction))
        .route("/community/posts/{id}/save", post(community::toggle_save))
        .route("/community/saved", get(community::list_saved))
        .route("/calendar/day", get(calendar::resolve_day))
        .route("/calendar/week", get(calendar::resolve_week))
        .route("/tracking/sessions", post(tracking::record_session))
        .route("/tracking/sessions", get(tracking::list_sessions))
        .route("/tracking/sessions/{id}", delete(tracking::delete_session))
        .route("/tracking/eliminations", post(tracking::record_elimination))
        .route("/tracking/eliminations", get(tracking::list_eliminations))
        .route("/tracking/eliminations/{id}", delete(tracking::delete_elimination))
        .route("/tracking/signal-options", get(tracking::signal_options))
        .route("/tracking/reports/diary", get(tracking::diary_report))
        .route("/tracking/reports/signals", get(tracking::signal_report))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Community reads and feedback: work anonymously, richer signed in
    let optional_auth_routes = Router::new()
        .route("/community/posts", get(community::list_feed))
        .route("/community/posts/{id}", get(community::get_post))
        .route("/community/posts/{id}/comments", get(community::list_comments))
        .route("/posts/{id}/feedback", post(posts::add_feedback))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ));

    Router::new()
        .route("/auth/login", post(auth::request_login))
        .route("/auth/verify", get(auth::verify))
        .route("/posts", get(posts::list_posts))
        .route("/posts/{id}", get(posts::get_post))
        .route("/posts/{id}/feedback", get(posts::feedback_stats))
        .route("/outreach/subscribe", post(outreach::subscribe))
        .route("/outreach/referrals", post(outreach::refer))
        .route("/outreach/waitlist", post(outreach::join_waitlist))
        .merge(optional_auth_routes)
        .merge(protected_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);
    if let Ok(origin) = cors_origin.parse::<HeaderValue>() {
        cors = cors.allow_origin(origin);
    }

    Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn not_found() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::not_found("No such endpoint")),
    )
}
