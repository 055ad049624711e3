//! Profile service
//!
//! Wraps the one-row-per-user profile store. The onboarding flag lives on
//! the profile row and nowhere else, so "has this user onboarded" is
//! answered here.

use anyhow::Result;
use std::sync::Arc;

use crate::db::repositories::ProfileRepository;
use crate::models::{Profile, ProfileInput};
use crate::services::validation::validate_profile;
use crate::services::ServiceError;

pub struct ProfileService {
    repo: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn ProfileRepository>) -> Self {
        Self { repo }
    }

    pub async fn save(&self, user_id: i64, input: ProfileInput) -> Result<Profile, ServiceError> {
        validate_profile(&input)?;
        Ok(self.repo.upsert(user_id, input).await?)
    }

    pub async fn get(&self, user_id: i64) -> Result<Option<Profile>> {
        self.repo.get(user_id).await
    }

    /// Server-side truth for onboarding completion
    pub async fn has_completed_onboarding(&self, user_id: i64) -> Result<bool> {
        Ok(self
            .repo
            .get(user_id)
            .await?
            .map(|p| p.onboarding_completed)
            .unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::{SqlxProfileRepository, SqlxUserRepository, UserRepository};
    use crate::models::Interest;

    async fn service() -> (ProfileService, i64) {
        let pool = create_test_pool().await.unwrap();
        let users = SqlxUserRepository::new(pool.clone());
        let user = users.find_or_create_by_email("a@b.se", "sv").await.unwrap();
        (ProfileService::new(SqlxProfileRepository::boxed(pool)), user.id)
    }

    #[tokio::test]
    async fn test_onboarding_flag_from_profile_row() {
        let (service, user_id) = service().await;
        assert!(!service.has_completed_onboarding(user_id).await.unwrap());

        service.save(user_id, ProfileInput::skipped()).await.unwrap();
        assert!(service.has_completed_onboarding(user_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_interest_cap_enforced_on_save() {
        let (service, user_id) = service().await;
        let input = ProfileInput {
            interests: vec![
                Interest::Breastfeeding,
                Interest::SleepRoutines,
                Interest::OwnRecovery,
            ],
            ..Default::default()
        };
        assert!(matches!(
            service.save(user_id, input).await,
            Err(ServiceError::Validation(_))
        ));
        // Nothing was stored
        assert!(service.get(user_id).await.unwrap().is_none());
    }
}
