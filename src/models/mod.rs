//! Data models
//!
//! Persisted entities and their input types. All models serialize with
//! serde and map 1:1 onto the SQLite schema in `crate::db::migrations`.

pub mod calendar;
pub mod community;
pub mod feedback;
pub mod outreach;
pub mod post;
pub mod profile;
pub mod tracking;
pub mod user;

pub use calendar::{weekday_index, CalendarContent, ContentType, MaternityPhase, WeekContent};
pub use community::{
    CommunityComment, CommunityPost, CommunityPostWithMeta, CreateCommentInput,
    CreateCommunityPostInput, CommunityCategory, MAX_COMMENT_CONTENT_CHARS,
    MAX_POST_CONTENT_CHARS,
};
pub use feedback::{FeedbackStats, PostFeedback};
pub use outreach::{Referral, Subscriber, WaitlistEmail};
pub use post::{
    CreatePostInput, ListParams, PagedResult, Post, PostCategory, UpdatePostInput,
};
pub use profile::{BabyAvatar, ContentStyle, Interest, Profile, ProfileInput, MAX_INTERESTS};
pub use tracking::{
    BreastfeedingSession, BreastSide, CaptureStatus, CreateEliminationInput,
    CreateSessionInput, EliminationEntry, EliminationType,
};
pub use user::{
    hash_token, new_token, LoginToken, Session, User, LOGIN_TOKEN_TTL_MINUTES, SESSION_TTL_DAYS,
};
