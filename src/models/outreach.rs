//! Marketing-page signup models
//!
//! Newsletter subscribers, referral registrations and waitlist emails
//! collected by the public landing page.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Newsletter subscriber
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: i64,
    /// Unique, lowercased email
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A referral made by an existing subscriber
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: i64,
    /// Email of the person who referred
    pub referrer_email: String,
    /// Email of the person being referred
    pub referred_email: String,
    pub created_at: DateTime<Utc>,
}

/// Waitlist signup for unreleased features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitlistEmail {
    pub id: i64,
    /// Unique, lowercased email
    pub email: String,
    /// Which feature the signup is for
    pub feature: String,
    pub created_at: DateTime<Utc>,
}
