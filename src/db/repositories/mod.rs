//! Repository layer
//!
//! One repository per aggregate: a trait defining the data-access
//! interface plus a sqlx-backed implementation. Services depend on the
//! traits so tests can swap implementations.

pub mod calendar;
pub mod community;
pub mod feedback;
pub mod outreach;
pub mod post;
pub mod profile;
pub mod session;
pub mod tracking;
pub mod user;

pub use calendar::{CalendarRepository, NewCalendarContent, SqlxCalendarRepository};
pub use community::{CommunityRepository, FeedFilter, SqlxCommunityRepository};
pub use feedback::{FeedbackRepository, SqlxFeedbackRepository};
pub use outreach::{OutreachRepository, SqlxOutreachRepository};
pub use post::{PostListFilter, PostRepository, SqlxPostRepository};
pub use profile::{ProfileRepository, SqlxProfileRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use tracking::{SqlxTrackingRepository, TrackingRepository};
pub use user::{LoginTokenRepository, SqlxLoginTokenRepository, SqlxUserRepository, UserRepository};
