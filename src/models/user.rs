//! User identity, sessions and login tokens
//!
//! Sign-in is passwordless: a short-lived single-use login token is mailed
//! to the user, and verifying it issues a long-lived session token. Only
//! the SHA-256 hash of a login token is ever persisted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated user identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Unique email address (lowercased)
    pub email: String,
    /// Preferred locale ("sv" is the default locale, unprefixed in links)
    pub locale: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last successful sign-in
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Session lifetime: 30 days
pub const SESSION_TTL_DAYS: i64 = 30;

/// Login-token lifetime: 15 minutes
pub const LOGIN_TOKEN_TTL_MINUTES: i64 = 15;

/// An active session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token, also the primary key
    pub id: String,
    /// Owning user
    pub user_id: i64,
    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session for a user with the default lifetime
    pub fn new(user_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: new_token(),
            user_id,
            expires_at: now + Duration::days(SESSION_TTL_DAYS),
            created_at: now,
        }
    }

    /// Whether the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// A pending magic-link login token (hashed at rest)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginToken {
    /// SHA-256 hex digest of the token, also the primary key
    pub token_hash: String,
    /// Email the link was sent to
    pub email: String,
    /// Locale used to build the redirect target
    pub locale: String,
    /// Expiry timestamp
    pub expires_at: DateTime<Utc>,
    /// Set once the token has been consumed
    pub used_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl LoginToken {
    /// Build a pending token record from a cleartext token
    pub fn new(token: &str, email: &str, locale: &str) -> Self {
        let now = Utc::now();
        Self {
            token_hash: hash_token(token),
            email: email.to_lowercase(),
            locale: locale.to_string(),
            expires_at: now + Duration::minutes(LOGIN_TOKEN_TTL_MINUTES),
            used_at: None,
            created_at: now,
        }
    }

    /// Whether the token can still be redeemed
    pub fn is_redeemable(&self) -> bool {
        self.used_at.is_none() && self.expires_at > Utc::now()
    }
}

/// Generate a fresh opaque token
pub fn new_token() -> String {
    // Two v4 UUIDs give 256 bits of randomness in a URL-safe string
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

/// SHA-256 hex digest of a cleartext token
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_token_is_unique() {
        assert_ne!(new_token(), new_token());
        assert_eq!(new_token().len(), 64);
    }

    #[test]
    fn test_hash_token_is_stable() {
        assert_eq!(hash_token("abc"), hash_token("abc"));
        assert_ne!(hash_token("abc"), hash_token("abd"));
    }

    #[test]
    fn test_login_token_redeemable() {
        let token = LoginToken::new("secret", "Mother@Example.com", "en");
        assert!(token.is_redeemable());
        assert_eq!(token.email, "mother@example.com");

        let mut used = token.clone();
        used.used_at = Some(Utc::now());
        assert!(!used.is_redeemable());
    }

    #[test]
    fn test_session_expiry() {
        let session = Session::new(1);
        assert!(!session.is_expired());

        let mut expired = session.clone();
        expired.expires_at = Utc::now() - Duration::minutes(1);
        assert!(expired.is_expired());
    }
}
