//! Tracking tool models
//!
//! Breastfeeding timer sessions and elimination-communication (EC) diary
//! entries, both scoped to a single user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A completed breastfeeding session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreastfeedingSession {
    pub id: i64,
    pub user_id: i64,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// When the session ended
    pub ended_at: DateTime<Utc>,
    /// Duration in seconds, recorded by the client timer
    pub duration_seconds: i64,
    /// Which side was used
    pub side: BreastSide,
    /// Optional free-text notes
    pub notes: Option<String>,
}

/// Side selection for a breastfeeding session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreastSide {
    Left,
    Right,
    Both,
}

impl BreastSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreastSide::Left => "left",
            BreastSide::Right => "right",
            BreastSide::Both => "both",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(BreastSide::Left),
            "right" => Some(BreastSide::Right),
            "both" => Some(BreastSide::Both),
            _ => None,
        }
    }
}

/// Input for recording a breastfeeding session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionInput {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_seconds: i64,
    pub side: BreastSide,
    pub notes: Option<String>,
}

/// An elimination-communication diary entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EliminationEntry {
    pub id: i64,
    pub user_id: i64,
    /// When the elimination happened
    pub occurred_at: DateTime<Utc>,
    /// What was eliminated
    pub elimination_type: EliminationType,
    /// Where it happened (potty, diaper, sink...)
    pub location: String,
    /// Whether the caregiver caught it in time
    pub capture_status: CaptureStatus,
    /// Signals observed before the elimination
    pub signals: Vec<String>,
    /// Optional free-text observation
    pub notes: Option<String>,
}

/// Elimination type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EliminationType {
    Pee,
    Poo,
    Both,
}

impl EliminationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EliminationType::Pee => "pee",
            EliminationType::Poo => "poo",
            EliminationType::Both => "both",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pee" => Some(EliminationType::Pee),
            "poo" => Some(EliminationType::Poo),
            "both" => Some(EliminationType::Both),
            _ => None,
        }
    }
}

/// Whether an elimination was caught or missed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStatus {
    Captured,
    Missed,
}

impl CaptureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureStatus::Captured => "captured",
            CaptureStatus::Missed => "missed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "captured" => Some(CaptureStatus::Captured),
            "missed" => Some(CaptureStatus::Missed),
            _ => None,
        }
    }
}

/// Input for recording an elimination entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEliminationInput {
    pub occurred_at: DateTime<Utc>,
    pub elimination_type: EliminationType,
    pub location: String,
    pub capture_status: CaptureStatus,
    #[serde(default)]
    pub signals: Vec<String>,
    pub notes: Option<String>,
}
