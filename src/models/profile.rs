//! User profile model
//!
//! One profile row per user, created or replaced by the onboarding flow.
//! The onboarding-completed flag lives on the profile row itself: the
//! server record is the single source of truth, clients may only cache it.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of interests a profile may carry
pub const MAX_INTERESTS: usize = 2;

/// User profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Owning user, also the primary key
    pub user_id: i64,
    /// Display name
    pub name: String,
    /// Mother's birth date
    pub birth_date: Option<NaiveDate>,
    /// Number of previous births
    pub previous_births: Option<i32>,
    /// Baby's name
    pub baby_name: Option<String>,
    /// Baby's birth date, drives the personalized calendar
    pub baby_birth_date: Option<NaiveDate>,
    /// Chosen baby avatar
    pub baby_avatar: Option<BabyAvatar>,
    /// Selected interests, at most `MAX_INTERESTS`
    pub interests: Vec<Interest>,
    /// Preferred content style
    pub content_style: Option<ContentStyle>,
    /// Whether the user wants access to specialists
    pub wants_specialist_access: bool,
    /// Whether onboarding has been completed (or skipped)
    pub onboarding_completed: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Baby avatar choices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BabyAvatar {
    Bear,
    Bunny,
    Fox,
    Owl,
}

impl BabyAvatar {
    pub fn as_str(&self) -> &'static str {
        match self {
            BabyAvatar::Bear => "bear",
            BabyAvatar::Bunny => "bunny",
            BabyAvatar::Fox => "fox",
            BabyAvatar::Owl => "owl",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "bear" => Some(BabyAvatar::Bear),
            "bunny" => Some(BabyAvatar::Bunny),
            "fox" => Some(BabyAvatar::Fox),
            "owl" => Some(BabyAvatar::Owl),
            _ => None,
        }
    }
}

/// Interest tags offered during onboarding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interest {
    Breastfeeding,
    SleepRoutines,
    BabyDevelopment,
    OwnRecovery,
    MentalWellbeing,
    EliminationCommunication,
}

impl Interest {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interest::Breastfeeding => "breastfeeding",
            Interest::SleepRoutines => "sleep-routines",
            Interest::BabyDevelopment => "baby-development",
            Interest::OwnRecovery => "own-recovery",
            Interest::MentalWellbeing => "mental-wellbeing",
            Interest::EliminationCommunication => "elimination-communication",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "breastfeeding" => Some(Interest::Breastfeeding),
            "sleep-routines" => Some(Interest::SleepRoutines),
            "baby-development" => Some(Interest::BabyDevelopment),
            "own-recovery" => Some(Interest::OwnRecovery),
            "mental-wellbeing" => Some(Interest::MentalWellbeing),
            "elimination-communication" => Some(Interest::EliminationCommunication),
            _ => None,
        }
    }
}

/// Preferred content style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStyle {
    /// Short, practical pieces
    Practical,
    /// Longer, in-depth reading
    InDepth,
    /// Audio-first content
    Audio,
}

impl ContentStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentStyle::Practical => "practical",
            ContentStyle::InDepth => "indepth",
            ContentStyle::Audio => "audio",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "practical" => Some(ContentStyle::Practical),
            "indepth" => Some(ContentStyle::InDepth),
            "audio" => Some(ContentStyle::Audio),
            _ => None,
        }
    }
}

/// Input for creating or replacing a profile (upsert semantics)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileInput {
    pub name: String,
    pub birth_date: Option<NaiveDate>,
    pub previous_births: Option<i32>,
    pub baby_name: Option<String>,
    pub baby_birth_date: Option<NaiveDate>,
    pub baby_avatar: Option<BabyAvatar>,
    #[serde(default)]
    pub interests: Vec<Interest>,
    pub content_style: Option<ContentStyle>,
    #[serde(default)]
    pub wants_specialist_access: bool,
    #[serde(default)]
    pub onboarding_completed: bool,
}

impl ProfileInput {
    /// The minimal record persisted when onboarding is skipped
    pub fn skipped() -> Self {
        Self {
            onboarding_completed: true,
            ..Self::default()
        }
    }
}
