//! Nurtura - backend for a maternal wellness app

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nurtura::{
    api::{self, AppState},
    cache::QueryCache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCalendarRepository, SqlxCommunityRepository, SqlxFeedbackRepository,
            SqlxLoginTokenRepository, SqlxOutreachRepository, SqlxPostRepository,
            SqlxProfileRepository, SqlxSessionRepository, SqlxTrackingRepository,
            SqlxUserRepository,
        },
    },
    services::{
        AuthService, CalendarService, CommunityService, EmailService, OutreachService,
        PostService, ProfileService, TrackingService,
    },
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nurtura=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Nurtura backend...");

    let config = Config::load(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected");

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let cache = QueryCache::shared(&config.cache);
    tracing::info!("Query cache initialized");

    let email_service = Arc::new(EmailService::new(config.email.clone()));

    let auth_service = Arc::new(AuthService::new(
        SqlxUserRepository::boxed(pool.clone()),
        SqlxLoginTokenRepository::boxed(pool.clone()),
        SqlxSessionRepository::boxed(pool.clone()),
        email_service,
        config.site.clone(),
    ));
    let post_service = Arc::new(PostService::new(
        SqlxPostRepository::boxed(pool.clone()),
        SqlxFeedbackRepository::boxed(pool.clone()),
        cache.clone(),
        config.site.default_language.clone(),
    ));
    let profile_service = Arc::new(ProfileService::new(SqlxProfileRepository::boxed(
        pool.clone(),
    )));
    let community_service = Arc::new(CommunityService::new(
        SqlxCommunityRepository::boxed(pool.clone()),
        cache.clone(),
    ));
    let calendar_service = Arc::new(CalendarService::new(SqlxCalendarRepository::boxed(
        pool.clone(),
    )));
    let tracking_service = Arc::new(TrackingService::new(SqlxTrackingRepository::boxed(
        pool.clone(),
    )));
    let outreach_service = Arc::new(OutreachService::new(SqlxOutreachRepository::boxed(
        pool.clone(),
    )));

    let state = AppState {
        config: Arc::new(config.clone()),
        auth_service: auth_service.clone(),
        post_service,
        profile_service,
        community_service,
        calendar_service,
        tracking_service,
        outreach_service,
    };

    // Purge expired sessions and login tokens every hour
    {
        let auth = auth_service.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(3600));
            loop {
                interval.tick().await;
                match auth.purge_expired().await {
                    Ok((sessions, tokens)) => {
                        if sessions > 0 || tokens > 0 {
                            tracing::info!(sessions, tokens, "Purged expired auth records");
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Auth cleanup failed"),
                }
            }
        });
    }

    let app = api::build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
