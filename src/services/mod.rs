//! Business logic layer
//!
//! Services sit between the API handlers and the repositories: they run
//! validation, orchestrate the query cache, and own cross-repository
//! flows like sign-in. Handlers never talk to a repository directly.

pub mod auth;
pub mod calendar;
pub mod community;
pub mod email;
pub mod onboarding;
pub mod outreach;
pub mod post;
pub mod profile;
pub mod report;
pub mod tracking;
pub mod validation;

use thiserror::Error;

use crate::services::validation::ValidationError;

pub use auth::{AuthError, AuthService, VerifiedLogin};
pub use calendar::CalendarService;
pub use community::CommunityService;
pub use email::EmailService;
pub use onboarding::{OnboardingError, OnboardingFlow, OnboardingStep};
pub use outreach::OutreachService;
pub use post::PostService;
pub use profile::ProfileService;
pub use tracking::TrackingService;

/// Errors shared by the service layer
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid time range")]
    InvalidRange,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
