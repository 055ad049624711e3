//! Post feedback model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reader feedback on an editorial post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFeedback {
    pub id: i64,
    pub post_id: i64,
    /// Submitting user, if signed in
    pub user_id: Option<i64>,
    /// Whether the reader found the post helpful
    pub was_helpful: bool,
    /// Optional free-text improvement suggestion
    pub suggestion: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregated feedback statistics for one post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackStats {
    pub post_id: i64,
    /// Total feedback rows
    pub total: i64,
    /// Rows marked helpful
    pub helpful: i64,
    /// Percentage of rows marked helpful, 0 when there is no feedback
    pub helpful_percent: f64,
}

impl FeedbackStats {
    pub fn new(post_id: i64, total: i64, helpful: i64) -> Self {
        let helpful_percent = if total > 0 {
            (helpful as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        Self {
            post_id,
            total,
            helpful,
            helpful_percent,
        }
    }
}
