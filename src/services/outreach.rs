//! Marketing signup service

use anyhow::Result;
use std::sync::Arc;

use crate::db::repositories::OutreachRepository;
use crate::services::validation::validate_email;
use crate::services::ServiceError;

pub struct OutreachService {
    repo: Arc<dyn OutreachRepository>,
}

impl OutreachService {
    pub fn new(repo: Arc<dyn OutreachRepository>) -> Self {
        Self { repo }
    }

    pub async fn subscribe(&self, email: &str) -> Result<(), ServiceError> {
        validate_email(email)?;
        Ok(self.repo.subscribe(email).await?)
    }

    pub async fn refer(
        &self,
        referrer_email: &str,
        referred_email: &str,
    ) -> Result<i64, ServiceError> {
        validate_email(referrer_email)?;
        validate_email(referred_email)?;
        self.repo.add_referral(referrer_email, referred_email).await?;
        Ok(self.repo.referral_count(referrer_email).await?)
    }

    pub async fn join_waitlist(&self, email: &str, feature: &str) -> Result<(), ServiceError> {
        validate_email(email)?;
        if feature.trim().is_empty() {
            return Err(ServiceError::Validation(
                crate::services::validation::ValidationError::Empty { field: "feature" },
            ));
        }
        Ok(self.repo.join_waitlist(email, feature).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::repositories::SqlxOutreachRepository;

    async fn service() -> OutreachService {
        let pool = create_test_pool().await.unwrap();
        OutreachService::new(SqlxOutreachRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_referral_returns_running_count() {
        let service = service().await;
        assert_eq!(
            service.refer("anna@example.com", "maja@example.com").await.unwrap(),
            1
        );
        assert_eq!(
            service.refer("anna@example.com", "eva@example.com").await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_bad_email_rejected() {
        let service = service().await;
        assert!(matches!(
            service.subscribe("nope").await,
            Err(ServiceError::Validation(_))
        ));
    }
}
