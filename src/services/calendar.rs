//! Calendar content resolver
//!
//! Maps a (baby birth date, target date) pair onto the catalog. The three
//! outcomes stay distinct all the way to the API: content found, no
//! content for that day, and lookup failure. A profile without a birth
//! date resolves to no content rather than inventing a default age.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use futures::future::join_all;
use std::sync::Arc;

use crate::db::repositories::CalendarRepository;
use crate::models::{weekday_index, CalendarContent, WeekContent};

pub struct CalendarService {
    repo: Arc<dyn CalendarRepository>,
}

impl CalendarService {
    pub fn new(repo: Arc<dyn CalendarRepository>) -> Self {
        Self { repo }
    }

    /// Resolve content for one day.
    ///
    /// `Ok(None)` means "nothing scheduled", distinct from `Err` which
    /// means the lookup itself failed.
    pub async fn resolve_day(
        &self,
        baby_birth_date: Option<NaiveDate>,
        target: NaiveDate,
    ) -> Result<Option<CalendarContent>> {
        let Some(birth) = baby_birth_date else {
            tracing::warn!("Calendar resolution without a baby birth date");
            return Ok(None);
        };

        let age_days = (target - birth).num_days();
        if age_days < 0 {
            return Ok(None);
        }

        self.repo
            .find_for_day(age_days, age_days / 7, weekday_index(target.weekday()))
            .await
    }

    /// Resolve the seven days starting at `week_start`, concurrently.
    pub async fn resolve_week(
        &self,
        baby_birth_date: Option<NaiveDate>,
        week_start: NaiveDate,
    ) -> Result<WeekContent> {
        let days: Vec<NaiveDate> = (0..7)
            .map(|offset| week_start + Duration::days(offset))
            .collect();

        let lookups = days
            .iter()
            .map(|&day| async move { (day, self.resolve_day(baby_birth_date, day).await) });

        let mut week = WeekContent::new();
        for (day, result) in join_all(lookups).await {
            week.insert(day, result?);
        }
        Ok(week)
    }
}
