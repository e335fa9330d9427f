//! Usage tracking service

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::domain::api_key::{ApiKeyRejection, ClientId, UsageLimits};
use crate::domain::usage::{
    QuotaCounters, QuotaPeriods, QuotaReservation, UsageOutcome, UsageRepository, UsageStats,
    UsageSummary,
};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
pub struct UsageTrackingService {
    repository: Arc<dyn UsageRepository>,
}

impl UsageTrackingService {
    pub fn new(repository: Arc<dyn UsageRepository>) -> Self {
        Self { repository }
    }

    /// Count one request against the current month and day.
    ///
    /// The outer error is a storage failure; the inner one a quota refusal.
    pub async fn reserve(
        &self,
        client_id: &ClientId,
        limits: &UsageLimits,
    ) -> Result<Result<QuotaReservation, ApiKeyRejection>, DomainError> {
        let decision = self
            .repository
            .reserve(client_id, &QuotaPeriods::current(), limits)
            .await?
            .into_result();

        match &decision {
            Ok(reservation) => debug!(
                client_id = %client_id,
                monthly = reservation.counters.monthly,
                daily = reservation.counters.daily,
                "Quota reserved"
            ),
            Err(rejection) => warn!(client_id = %client_id, reason = %rejection, "Quota denied"),
        }

        Ok(decision)
    }

    pub async fn release(&self, reservation: &QuotaReservation) -> Result<(), DomainError> {
        self.repository.release(reservation).await
    }

    pub async fn counters(&self, client_id: &ClientId) -> Result<QuotaCounters, DomainError> {
        self.repository
            .counters(client_id, &QuotaPeriods::current())
            .await
    }

    pub async fn record(
        &self,
        client_id: &ClientId,
        outcome: UsageOutcome,
    ) -> Result<(), DomainError> {
        self.repository.record(client_id, outcome, Utc::now()).await
    }

    pub async fn stats(&self, client_id: &ClientId) -> Result<UsageStats, DomainError> {
        self.repository.stats(client_id).await
    }

    pub async fn summary(&self, client_id: &ClientId) -> Result<UsageSummary, DomainError> {
        Ok(self.repository.stats(client_id).await?.summary())
    }

    pub async fn delete(&self, client_id: &ClientId) -> Result<(), DomainError> {
        self.repository.delete(client_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::usage::InMemoryUsageRepository;

    fn service() -> UsageTrackingService {
        UsageTrackingService::new(Arc::new(InMemoryUsageRepository::new()))
    }

    #[tokio::test]
    async fn test_reserve_then_deny() {
        let service = service();
        let client = ClientId::generate();
        let limits = UsageLimits::new(1, 1, 1, 100);

        assert!(service.reserve(&client, &limits).await.unwrap().is_ok());
        assert_eq!(
            service.reserve(&client, &limits).await.unwrap().unwrap_err(),
            ApiKeyRejection::MonthlyLimitExceeded
        );
    }

    #[tokio::test]
    async fn test_release_restores_counters() {
        let service = service();
        let client = ClientId::generate();
        let limits = UsageLimits::new(10, 10, 1, 100);

        let reservation = service.reserve(&client, &limits).await.unwrap().unwrap();
        assert_eq!(service.counters(&client).await.unwrap().monthly, 1);

        service.release(&reservation).await.unwrap();
        assert_eq!(service.counters(&client).await.unwrap().monthly, 0);
    }

    #[tokio::test]
    async fn test_summary() {
        let service = service();
        let client = ClientId::generate();

        service.record(&client, UsageOutcome::Success).await.unwrap();
        service.record(&client, UsageOutcome::Failure).await.unwrap();

        let summary = service.summary(&client).await.unwrap();
        assert_eq!(summary.total_requests, 2);
        assert_eq!(summary.monthly_requests, 2);
        assert!((summary.success_rate - 50.0).abs() < f64::EPSILON);
        assert!(summary.last_used.is_some());
    }

    #[tokio::test]
    async fn test_summary_without_history() {
        let summary = service().summary(&ClientId::generate()).await.unwrap();
        assert_eq!(summary.total_requests, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert!(summary.last_used.is_none());
    }
}
