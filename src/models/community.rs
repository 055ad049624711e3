//! Community forum models
//!
//! Posts, comments, reactions and bookmarks. A user holds at most one
//! reaction and one bookmark per post; both are toggled, never duplicated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum community post length in characters
pub const MAX_POST_CONTENT_CHARS: usize = 1200;

/// Maximum comment length in characters
pub const MAX_COMMENT_CONTENT_CHARS: usize = 600;

/// Community post entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPost {
    /// Unique identifier
    pub id: i64,
    /// Author; None once the author account is gone
    pub author_id: Option<i64>,
    /// Discussion category
    pub category: CommunityCategory,
    /// Free-text content, capped at `MAX_POST_CONTENT_CHARS`
    pub content: String,
    /// Hide the author's name when displayed
    pub anonymous: bool,
    /// Whether other members may message the author privately
    pub allow_private_messages: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Community discussion categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommunityCategory {
    Breastfeeding,
    Sleep,
    Recovery,
    Relationships,
    EverydayLife,
    AskAnything,
}

impl CommunityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommunityCategory::Breastfeeding => "breastfeeding",
            CommunityCategory::Sleep => "sleep",
            CommunityCategory::Recovery => "recovery",
            CommunityCategory::Relationships => "relationships",
            CommunityCategory::EverydayLife => "everyday-life",
            CommunityCategory::AskAnything => "ask-anything",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "breastfeeding" => Some(CommunityCategory::Breastfeeding),
            "sleep" => Some(CommunityCategory::Sleep),
            "recovery" => Some(CommunityCategory::Recovery),
            "relationships" => Some(CommunityCategory::Relationships),
            "everyday-life" => Some(CommunityCategory::EverydayLife),
            "ask-anything" => Some(CommunityCategory::AskAnything),
            _ => None,
        }
    }
}

impl std::fmt::Display for CommunityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A community post as presented in the feed: the row plus its derived
/// counts and the viewing user's own reaction/bookmark state. Produced by
/// a single aggregated query, never by per-row follow-up lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPostWithMeta {
    #[serde(flatten)]
    pub post: CommunityPost,
    /// Author display name; None for anonymous posts
    pub author_name: Option<String>,
    /// Number of comments on the post
    pub comment_count: i64,
    /// Number of reactions on the post
    pub reaction_count: i64,
    /// Whether the viewing user has reacted
    pub viewer_reacted: bool,
    /// Whether the viewing user has bookmarked the post
    pub viewer_saved: bool,
}

/// Comment on a community post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityComment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: Option<i64>,
    pub content: String,
    pub anonymous: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a community post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommunityPostInput {
    pub category: CommunityCategory,
    pub content: String,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default = "default_true")]
    pub allow_private_messages: bool,
}

/// Input for creating a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentInput {
    pub post_id: i64,
    pub content: String,
    #[serde(default)]
    pub anonymous: bool,
}

fn default_true() -> bool {
    true
}
