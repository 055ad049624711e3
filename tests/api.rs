//! End-to-end API tests
//!
//! Drive the full router against an in-memory database: auth gating,
//! the JSON error envelope, and a representative slice of each endpoint
//! group.

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use nurtura::api::{build_router, AppState};
use nurtura::cache::QueryCache;
use nurtura::config::Config;
use nurtura::db::repositories::{
    SessionRepository, SqlxCalendarRepository, SqlxCommunityRepository, SqlxFeedbackRepository,
    SqlxLoginTokenRepository, SqlxOutreachRepository, SqlxPostRepository, SqlxProfileRepository,
    SqlxSessionRepository, SqlxTrackingRepository, SqlxUserRepository, UserRepository,
};
use nurtura::db::{create_test_pool, DbPool};
use nurtura::models::Session;
use nurtura::services::{
    AuthService, CalendarService, CommunityService, EmailService, OutreachService, PostService,
    ProfileService, TrackingService,
};

async fn test_server() -> (TestServer, DbPool) {
    let pool = create_test_pool().await.unwrap();
    let config = Config::default();
    let cache = QueryCache::shared(&config.cache);
    let email = Arc::new(EmailService::new(config.email.clone()));

    let state = AppState {
        auth_service: Arc::new(AuthService::new(
            SqlxUserRepository::boxed(pool.clone()),
            SqlxLoginTokenRepository::boxed(pool.clone()),
            SqlxSessionRepository::boxed(pool.clone()),
            email,
            config.site.clone(),
        )),
        post_service: Arc::new(PostService::new(
            SqlxPostRepository::boxed(pool.clone()),
            SqlxFeedbackRepository::boxed(pool.clone()),
            cache.clone(),
            config.site.default_language.clone(),
        )),
        profile_service: Arc::new(ProfileService::new(SqlxProfileRepository::boxed(
            pool.clone(),
        ))),
        community_service: Arc::new(CommunityService::new(
            SqlxCommunityRepository::boxed(pool.clone()),
            cache,
        )),
        calendar_service: Arc::new(CalendarService::new(SqlxCalendarRepository::boxed(
            pool.clone(),
        ))),
        tracking_service: Arc::new(TrackingService::new(SqlxTrackingRepository::boxed(
            pool.clone(),
        ))),
        outreach_service: Arc::new(OutreachService::new(SqlxOutreachRepository::boxed(
            pool.clone(),
        ))),
        config: Arc::new(config.clone()),
    };

    let app = build_router(state, &config.server.cors_origin);
    (TestServer::new(app).unwrap(), pool)
}

/// Create a user plus an active session, returning the bearer token
async fn sign_in(pool: &DbPool, email: &str) -> (i64, String) {
    let users = SqlxUserRepository::new(pool.clone());
    let user = users.find_or_create_by_email(email, "sv").await.unwrap();

    let sessions = SqlxSessionRepository::new(pool.clone());
    let session = Session::new(user.id);
    sessions.create(&session).await.unwrap();
    (user.id, session.id)
}

fn bearer(token: &str) -> axum::http::HeaderValue {
    axum::http::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() {
    let (server, _pool) = test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn unknown_endpoint_returns_error_envelope() {
    let (server, _pool) = test_server().await;
    let response = server.get("/no/such/path").await;
    response.assert_status_not_found();

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let (server, _pool) = test_server().await;

    let response = server.get("/api/v1/auth/me").await;
    response.assert_status_unauthorized();

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn me_returns_the_session_user() {
    let (server, pool) = test_server().await;
    let (user_id, token) = sign_in(&pool, "anna@example.com").await;

    let response = server
        .get("/api/v1/auth/me")
        .add_header(axum::http::header::AUTHORIZATION, bearer(&token))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["id"], user_id);
    assert_eq!(body["email"], "anna@example.com");
    assert_eq!(body["onboarding_completed"], false);
}

#[tokio::test]
async fn login_request_gives_the_same_answer_for_any_address() {
    let (server, _pool) = test_server().await;

    let first = server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "registered@example.com" }))
        .await;
    first.assert_status_ok();

    let second = server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "unknown@example.com" }))
        .await;
    second.assert_status_ok();

    let a: Value = first.json();
    let b: Value = second.json();
    assert_eq!(a, b);
}

#[tokio::test]
async fn verify_with_a_bad_token_is_rejected() {
    let (server, _pool) = test_server().await;
    let response = server.get("/api/v1/auth/verify?token=not-a-real-token").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn published_posts_are_public_and_drafts_are_not() {
    let (server, pool) = test_server().await;
    let (_user_id, token) = sign_in(&pool, "editor@example.com").await;

    let created = server
        .post("/api/v1/posts")
        .add_header(axum::http::header::AUTHORIZATION, bearer(&token))
        .json(&json!({
            "title": "Sömn under de första veckorna",
            "content": "Korta pass är normalt.",
            "author": "Redaktionen",
            "category": "baby-care",
            "published": false
        }))
        .await;
    created.assert_status_ok();
    let draft: Value = created.json();

    // Drafts are invisible to the public views
    let listed = server.get("/api/v1/posts").await;
    listed.assert_status_ok();
    let page: Value = listed.json();
    assert_eq!(page["total"], 0);

    let fetched = server
        .get(&format!("/api/v1/posts/{}", draft["id"]))
        .await;
    fetched.assert_status_not_found();

    // Publishing makes it appear
    let published = server
        .put(&format!("/api/v1/posts/{}", draft["id"]))
        .add_header(axum::http::header::AUTHORIZATION, bearer(&token))
        .json(&json!({ "published": true }))
        .await;
    published.assert_status_ok();

    let page: Value = server.get("/api/v1/posts").await.json();
    assert_eq!(page["total"], 1);
}

#[tokio::test]
async fn community_flow_posts_comments_and_reactions() {
    let (server, pool) = test_server().await;
    let (_user_id, token) = sign_in(&pool, "mamma@example.com").await;
    let auth = axum::http::header::AUTHORIZATION;

    let created = server
        .post("/api/v1/community/posts")
        .add_header(auth.clone(), bearer(&token))
        .json(&json!({
            "category": "sleep",
            "content": "Hur får ni till nattningen?"
        }))
        .await;
    created.assert_status_ok();
    let post: Value = created.json();

    // The feed is readable without a session
    let feed: Value = server.get("/api/v1/community/posts").await.json();
    assert_eq!(feed["total"], 1);
    assert_eq!(feed["items"][0]["viewer_reacted"], false);

    let reaction = server
        .post(&format!("/api/v1/community/posts/{}/reaction", post["id"]))
        .add_header(auth.clone(), bearer(&token))
        .await;
    reaction.assert_status_ok();
    reaction.assert_json(&json!({ "reacted": true }));

    let comment = server
        .post(&format!("/api/v1/community/posts/{}/comments", post["id"]))
        .add_header(auth.clone(), bearer(&token))
        .json(&json!({ "content": "Vi följer med!" }))
        .await;
    comment.assert_status_ok();

    // Signed-in feed reflects both writes
    let feed = server
        .get("/api/v1/community/posts")
        .add_header(auth, bearer(&token))
        .await;
    let feed: Value = feed.json();
    assert_eq!(feed["items"][0]["reaction_count"], 1);
    assert_eq!(feed["items"][0]["comment_count"], 1);
    assert_eq!(feed["items"][0]["viewer_reacted"], true);
}

#[tokio::test]
async fn over_length_community_post_is_rejected() {
    let (server, pool) = test_server().await;
    let (_user_id, token) = sign_in(&pool, "mamma@example.com").await;

    let response = server
        .post("/api/v1/community/posts")
        .add_header(axum::http::header::AUTHORIZATION, bearer(&token))
        .json(&json!({
            "category": "sleep",
            "content": "x".repeat(1201)
        }))
        .await;
    response.assert_status_bad_request();

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn profile_upsert_completes_onboarding() {
    let (server, pool) = test_server().await;
    let (_user_id, token) = sign_in(&pool, "anna@example.com").await;
    let auth = axum::http::header::AUTHORIZATION;

    let missing = server
        .get("/api/v1/profile")
        .add_header(auth.clone(), bearer(&token))
        .await;
    missing.assert_status_not_found();

    let saved = server
        .put("/api/v1/profile")
        .add_header(auth.clone(), bearer(&token))
        .json(&json!({
            "name": "Anna",
            "baby_name": "Elsa",
            "baby_birth_date": "2026-01-05",
            "interests": ["breastfeeding", "sleep-routines"],
            "onboarding_completed": true
        }))
        .await;
    saved.assert_status_ok();

    let me: Value = server
        .get("/api/v1/auth/me")
        .add_header(auth, bearer(&token))
        .await
        .json();
    assert_eq!(me["onboarding_completed"], true);
}

#[tokio::test]
async fn tracking_round_trip_and_signal_catalog() {
    let (server, pool) = test_server().await;
    let (_user_id, token) = sign_in(&pool, "anna@example.com").await;
    let auth = axum::http::header::AUTHORIZATION;

    let recorded = server
        .post("/api/v1/tracking/eliminations")
        .add_header(auth.clone(), bearer(&token))
        .json(&json!({
            "occurred_at": "2026-08-20T08:00:00Z",
            "elimination_type": "pee",
            "location": "potty",
            "capture_status": "captured",
            "signals": ["squirming"]
        }))
        .await;
    recorded.assert_status_ok();

    let listed = server
        .get("/api/v1/tracking/eliminations?from=2026-08-17T00:00:00Z&to=2026-08-24T00:00:00Z")
        .add_header(auth.clone(), bearer(&token))
        .await;
    listed.assert_status_ok();
    let entries: Value = listed.json();
    assert_eq!(entries.as_array().unwrap().len(), 1);

    let options = server
        .get("/api/v1/tracking/signal-options")
        .add_header(auth, bearer(&token))
        .await;
    options.assert_status_ok();
    let catalog: Value = options.json();
    assert!(catalog.as_array().unwrap().len() >= 5);
}

#[tokio::test]
async fn outreach_endpoints_are_public() {
    let (server, _pool) = test_server().await;

    let subscribed = server
        .post("/api/v1/outreach/subscribe")
        .json(&json!({ "email": "anna@example.com" }))
        .await;
    subscribed.assert_status_ok();

    let referred = server
        .post("/api/v1/outreach/referrals")
        .json(&json!({
            "referrer_email": "anna@example.com",
            "referred_email": "maja@example.com"
        }))
        .await;
    referred.assert_status_ok();
    referred.assert_json(&json!({ "referral_count": 1 }));
}
