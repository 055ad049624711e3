//! Authentication service
//!
//! Passwordless email-link sign-in. The request step stores only a hash
//! of the token and mails the cleartext link; the verify step consumes
//! the token once, creates the user on first sign-in and issues a 30-day
//! session. Session presence is the whole authorization model.

use anyhow::Result;
use std::sync::Arc;
use thiserror::Error;

use crate::config::SiteConfig;
use crate::db::repositories::{LoginTokenRepository, SessionRepository, UserRepository};
use crate::models::{hash_token, new_token, LoginToken, Session, User};
use crate::services::email::EmailService;
use crate::services::validation::{validate_email, ValidationError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("sign-in link is invalid or has expired")]
    InvalidToken,
    #[error("session is invalid or has expired")]
    InvalidSession,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Outcome of a successful verification
#[derive(Debug, Clone)]
pub struct VerifiedLogin {
    pub user: User,
    pub session: Session,
    /// Locale-aware path the client should land on
    pub redirect_path: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn LoginTokenRepository>,
    sessions: Arc<dyn SessionRepository>,
    email: Arc<EmailService>,
    site: SiteConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn LoginTokenRepository>,
        sessions: Arc<dyn SessionRepository>,
        email: Arc<EmailService>,
        site: SiteConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            sessions,
            email,
            site,
        }
    }

    /// Start a sign-in: store a hashed single-use token and mail the link.
    ///
    /// Always succeeds for a well-formed address, whether or not an
    /// account exists, so the endpoint leaks nothing about registered
    /// emails.
    pub async fn request_login(&self, email: &str, locale: &str) -> Result<(), AuthError> {
        validate_email(email)?;

        let cleartext = new_token();
        let token = LoginToken::new(&cleartext, email, locale);
        self.tokens.create(&token).await?;

        let link = format!(
            "{}/api/v1/auth/verify?token={}",
            self.site.base_url.trim_end_matches('/'),
            cleartext
        );
        self.email.send_login_link(&token.email, &link).await?;

        tracing::info!(email = %token.email, "Sign-in link issued");
        Ok(())
    }

    /// Redeem a sign-in link: consume the token, find-or-create the user
    /// and open a session.
    pub async fn verify(&self, cleartext_token: &str) -> Result<VerifiedLogin, AuthError> {
        let token = self
            .tokens
            .consume(&hash_token(cleartext_token))
            .await?
            .ok_or(AuthError::InvalidToken)?;

        let user = self
            .users
            .find_or_create_by_email(&token.email, &token.locale)
            .await?;
        self.users.touch_last_login(user.id).await?;

        let session = Session::new(user.id);
        self.sessions.create(&session).await?;

        tracing::info!(user_id = user.id, "User signed in");
        Ok(VerifiedLogin {
            redirect_path: self.site.app_path(&token.locale),
            user,
            session,
        })
    }

    /// Resolve a session token to its user
    pub async fn validate_session(&self, session_id: &str) -> Result<User, AuthError> {
        let session = self
            .sessions
            .get_by_id(session_id)
            .await?
            .ok_or(AuthError::InvalidSession)?;

        if session.is_expired() {
            self.sessions.delete(&session.id).await?;
            return Err(AuthError::InvalidSession);
        }

        self.users
            .get_by_id(session.user_id)
            .await?
            .ok_or(AuthError::InvalidSession)
    }

    /// Sign out
    pub async fn logout(&self, session_id: &str) -> Result<(), AuthError> {
        self.sessions.delete(session_id).await?;
        Ok(())
    }

    /// Remove expired sessions and tokens; called by the maintenance loop
    pub async fn purge_expired(&self) -> Result<(u64, u64)> {
        let sessions = self.sessions.delete_expired().await?;
        let tokens = self.tokens.delete_expired().await?;
        Ok((sessions, tokens))
    }
}
