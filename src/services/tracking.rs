//! Tracking service
//!
//! Breastfeeding timer sessions and elimination diary entries, scoped to
//! the authenticated user. Reads are range queries feeding the daily
//! views and the weekly reports.

use anyhow::Result;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::Arc;

use crate::db::repositories::TrackingRepository;
use crate::models::{
    BreastfeedingSession, CreateEliminationInput, CreateSessionInput, EliminationEntry,
};
use crate::services::ServiceError;

/// A signal suggestion offered by the diary entry form
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SignalOption {
    /// Stable identifier stored on diary entries
    pub id: &'static str,
    /// Swedish display label
    pub label: &'static str,
}

/// Signals commonly observed before an elimination, in display order.
/// Entries may also carry free-text signals outside this list.
pub static SIGNAL_OPTIONS: Lazy<Vec<SignalOption>> = Lazy::new(|| {
    vec![
        SignalOption { id: "squirming", label: "Skruvar på sig" },
        SignalOption { id: "fussing", label: "Gnäller" },
        SignalOption { id: "grimacing", label: "Grimaserar" },
        SignalOption { id: "straining", label: "Krystar" },
        SignalOption { id: "sudden-stillness", label: "Blir plötsligt stilla" },
        SignalOption { id: "waking", label: "Vaknar" },
        SignalOption { id: "after-feeding", label: "Precis efter matning" },
        SignalOption { id: "after-sleep", label: "Precis efter sömn" },
    ]
});

pub struct TrackingService {
    repo: Arc<dyn TrackingRepository>,
}

impl TrackingService {
    pub fn new(repo: Arc<dyn TrackingRepository>) -> Self {
        Self { repo }
    }

    pub async fn record_session(
        &self,
        user_id: i64,
        input: CreateSessionInput,
    ) -> Result<BreastfeedingSession, ServiceError> {
        if input.ended_at < input.started_at || input.duration_seconds < 0 {
            return Err(ServiceError::InvalidRange);
        }
        Ok(self.repo.create_session(user_id, input).await?)
    }

    pub async fn list_sessions(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<BreastfeedingSession>, ServiceError> {
        if to < from {
            return Err(ServiceError::InvalidRange);
        }
        Ok(self.repo.list_sessions(user_id, from, to).await?)
    }

    pub async fn delete_session(&self, id: i64, user_id: i64) -> Result<bool> {
        self.repo.delete_session(id, user_id).await
    }

    pub async fn record_elimination(
        &self,
        user_id: i64,
        input: CreateEliminationInput,
    ) -> Result<EliminationEntry, ServiceError> {
        if input.location.trim().is_empty() {
            return Err(ServiceError::Validation(
                crate::services::validation::ValidationError::Empty { field: "location" },
            ));
        }
        Ok(self.repo.create_elimination(user_id, input).await?)
    }

    pub async fn list_eliminations(
        &self,
        user_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EliminationEntry>, ServiceError> {
        if to < from {
            return Err(ServiceError::InvalidRange);
        }
        Ok(self.repo.list_eliminations(user_id, from, to).await?)
    }

    pub async fn delete_elimination(&self, id: i64, user_id: i64) -> Result<bool> {
        self.repo.delete_elimination(id, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::{SqlxTrackingRepository, SqlxUserRepository, UserRepository};
    use crate::models::BreastSide;
    use chrono::Duration;

    async fn service() -> (TrackingService, i64) {
        let pool = create_test_pool().await.unwrap();
        let users = SqlxUserRepository::new(pool.clone());
        let user = users.find_or_create_by_email("a@b.se", "sv").await.unwrap();
        (
            TrackingService::new(SqlxTrackingRepository::boxed(pool)),
            user.id,
        )
    }

    #[test]
    fn test_signal_option_ids_are_unique() {
        let mut ids: Vec<&str> = SIGNAL_OPTIONS.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SIGNAL_OPTIONS.len());
    }

    #[tokio::test]
    async fn test_session_end_before_start_rejected() {
        let (service, user_id) = service().await;
        let now = Utc::now();
        let input = CreateSessionInput {
            started_at: now,
            ended_at: now - Duration::minutes(5),
            duration_seconds: 300,
            side: BreastSide::Right,
            notes: None,
        };
        assert!(matches!(
            service.record_session(user_id, input).await,
            Err(ServiceError::InvalidRange)
        ));
    }

    #[tokio::test]
    async fn test_inverted_list_range_rejected() {
        let (service, user_id) = service().await;
        let now = Utc::now();
        assert!(matches!(
            service
                .list_sessions(user_id, now, now - Duration::days(1))
                .await,
            Err(ServiceError::InvalidRange)
        ));
    }

    #[tokio::test]
    async fn test_elimination_requires_location() {
        let (service, user_id) = service().await;
        let input = CreateEliminationInput {
            occurred_at: Utc::now(),
            elimination_type: crate::models::EliminationType::Pee,
            location: " ".to_string(),
            capture_status: crate::models::CaptureStatus::Captured,
            signals: vec![],
            notes: None,
        };
        assert!(matches!(
            service.record_elimination(user_id, input).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
