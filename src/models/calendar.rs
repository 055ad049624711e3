//! Calendar content model
//!
//! Catalog rows keyed by maternity phase, baby-age range, week offset and
//! day of week. Rows are looked up for a (birth date, target date) pair,
//! never created by end users.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A catalog row selectable for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarContent {
    pub id: i64,
    /// Coarse phase bucket the row belongs to
    pub phase: MaternityPhase,
    /// Inclusive lower bound on baby age in days
    pub age_min_days: i64,
    /// Inclusive upper bound on baby age in days
    pub age_max_days: i64,
    /// Optional week offset (baby age / 7) the row targets
    pub week_offset: Option<i64>,
    /// Optional day of week the row targets (0 = Monday .. 6 = Sunday)
    pub day_of_week: Option<i32>,
    /// Kind of content behind the row
    pub content_type: ContentType,
    /// Optional link to the content
    pub url: Option<String>,
    /// Structured content payload
    pub content_data: serde_json::Value,
    /// Whether the row requires a premium subscription
    pub premium: bool,
    pub created_at: DateTime<Utc>,
}

/// Coarse maternity phase derived from baby age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaternityPhase {
    /// 0-28 days
    Newborn,
    /// 29-365 days
    Infant,
    /// Over a year
    Toddler,
}

impl MaternityPhase {
    /// Bucket a baby age in days into a phase. Negative ages (target date
    /// before birth) bucket as newborn; the age range match still filters
    /// them out.
    pub fn from_age_days(age_days: i64) -> Self {
        match age_days {
            d if d <= 28 => MaternityPhase::Newborn,
            d if d <= 365 => MaternityPhase::Infant,
            _ => MaternityPhase::Toddler,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaternityPhase::Newborn => "newborn",
            MaternityPhase::Infant => "infant",
            MaternityPhase::Toddler => "toddler",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "newborn" => Some(MaternityPhase::Newborn),
            "infant" => Some(MaternityPhase::Infant),
            "toddler" => Some(MaternityPhase::Toddler),
            _ => None,
        }
    }
}

/// Kind of calendar content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Audio,
    Exercise,
    Tip,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Audio => "audio",
            ContentType::Exercise => "exercise",
            ContentType::Tip => "tip",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "article" => Some(ContentType::Article),
            "audio" => Some(ContentType::Audio),
            "exercise" => Some(ContentType::Exercise),
            "tip" => Some(ContentType::Tip),
            _ => None,
        }
    }
}

/// A resolved week of content, keyed by date rather than position
pub type WeekContent = HashMap<NaiveDate, Option<CalendarContent>>;

/// Day-of-week index used by the catalog (0 = Monday .. 6 = Sunday)
pub fn weekday_index(weekday: Weekday) -> i32 {
    weekday.num_days_from_monday() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_buckets() {
        assert_eq!(MaternityPhase::from_age_days(0), MaternityPhase::Newborn);
        assert_eq!(MaternityPhase::from_age_days(28), MaternityPhase::Newborn);
        assert_eq!(MaternityPhase::from_age_days(29), MaternityPhase::Infant);
        assert_eq!(MaternityPhase::from_age_days(365), MaternityPhase::Infant);
        assert_eq!(MaternityPhase::from_age_days(366), MaternityPhase::Toddler);
    }

    #[test]
    fn test_weekday_index() {
        assert_eq!(weekday_index(Weekday::Mon), 0);
        assert_eq!(weekday_index(Weekday::Sun), 6);
    }
}
