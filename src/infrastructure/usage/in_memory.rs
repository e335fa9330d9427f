//! In-memory usage repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKeyRejection, ClientId, UsageLimits};
use crate::domain::usage::{
    QuotaCounters, QuotaDecision, QuotaPeriods, QuotaReservation, UsageOutcome, UsageRepository,
    UsageStats,
};
use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum QuotaKey {
    Month(ClientId, String),
    Day(ClientId, String),
}

#[derive(Debug, Default)]
struct Inner {
    stats: HashMap<ClientId, UsageStats>,
    quotas: HashMap<QuotaKey, i64>,
}

impl Inner {
    fn counters(&self, client_id: &ClientId, periods: &QuotaPeriods) -> QuotaCounters {
        let read = |key: QuotaKey| self.quotas.get(&key).copied().unwrap_or(0);
        QuotaCounters {
            monthly: read(QuotaKey::Month(client_id.clone(), periods.month.clone())),
            daily: read(QuotaKey::Day(client_id.clone(), periods.day.clone())),
        }
    }

    fn add(&mut self, client_id: &ClientId, periods: &QuotaPeriods, delta: i64) {
        for key in [
            QuotaKey::Month(client_id.clone(), periods.month.clone()),
            QuotaKey::Day(client_id.clone(), periods.day.clone()),
        ] {
            let value = self.quotas.entry(key).or_insert(0);
            *value = (*value + delta).max(0);
        }
    }
}

/// Usage repository held in process memory. Reservations take the write lock,
/// so check and increment happen as one step.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUsageRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryUsageRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageRepository for InMemoryUsageRepository {
    async fn reserve(
        &self,
        client_id: &ClientId,
        periods: &QuotaPeriods,
        limits: &UsageLimits,
    ) -> Result<QuotaDecision, DomainError> {
        let mut inner = self.inner.write().await;
        let current = inner.counters(client_id, periods);

        let next = QuotaCounters {
            monthly: current.monthly + 1,
            daily: current.daily + 1,
        };

        if !limits.is_monthly_unlimited() && next.monthly > limits.monthly_limit {
            return Ok(QuotaDecision::Denied(ApiKeyRejection::MonthlyLimitExceeded));
        }
        if !limits.is_daily_unlimited() && next.daily > limits.daily_limit {
            return Ok(QuotaDecision::Denied(ApiKeyRejection::DailyLimitExceeded));
        }

        inner.add(client_id, periods, 1);

        Ok(QuotaDecision::Reserved(QuotaReservation {
            client_id: client_id.clone(),
            periods: periods.clone(),
            counters: next,
        }))
    }

    async fn release(&self, reservation: &QuotaReservation) -> Result<(), DomainError> {
        self.inner
            .write()
            .await
            .add(&reservation.client_id, &reservation.periods, -1);
        Ok(())
    }

    async fn counters(
        &self,
        client_id: &ClientId,
        periods: &QuotaPeriods,
    ) -> Result<QuotaCounters, DomainError> {
        Ok(self.inner.read().await.counters(client_id, periods))
    }

    async fn record(
        &self,
        client_id: &ClientId,
        outcome: UsageOutcome,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.inner
            .write()
            .await
            .stats
            .entry(client_id.clone())
            .or_default()
            .apply(outcome, at);
        Ok(())
    }

    async fn stats(&self, client_id: &ClientId) -> Result<UsageStats, DomainError> {
        Ok(self
            .inner
            .read()
            .await
            .stats
            .get(client_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete(&self, client_id: &ClientId) -> Result<(), DomainError> {
        let mut inner = self.inner.write().await;
        inner.stats.remove(client_id);
        inner.quotas.retain(|key, _| match key {
            QuotaKey::Month(id, _) | QuotaKey::Day(id, _) => id != client_id,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::{AccessLevel, UNLIMITED};

    fn limits(monthly: i64, daily: i64) -> UsageLimits {
        UsageLimits::new(monthly, daily, 5, 2000)
    }

    #[tokio::test]
    async fn test_reserve_up_to_limit() {
        let repo = InMemoryUsageRepository::new();
        let client = ClientId::generate();
        let periods = QuotaPeriods::current();
        let limits = limits(3, 10);

        for expected in 1..=3 {
            let reservation = repo
                .reserve(&client, &periods, &limits)
                .await
                .unwrap()
                .into_result()
                .unwrap();
            assert_eq!(reservation.counters.monthly, expected);
        }

        let decision = repo.reserve(&client, &periods, &limits).await.unwrap();
        assert_eq!(
            decision,
            QuotaDecision::Denied(ApiKeyRejection::MonthlyLimitExceeded)
        );
        assert_eq!(repo.counters(&client, &periods).await.unwrap().monthly, 3);
    }

    #[tokio::test]
    async fn test_daily_limit() {
        let repo = InMemoryUsageRepository::new();
        let client = ClientId::generate();
        let periods = QuotaPeriods::current();
        let limits = limits(100, 1);

        repo.reserve(&client, &periods, &limits).await.unwrap();
        let decision = repo.reserve(&client, &periods, &limits).await.unwrap();

        assert_eq!(
            decision,
            QuotaDecision::Denied(ApiKeyRejection::DailyLimitExceeded)
        );
    }

    #[tokio::test]
    async fn test_unlimited_is_counted_but_never_denied() {
        let repo = InMemoryUsageRepository::new();
        let client = ClientId::generate();
        let periods = QuotaPeriods::current();
        let limits = AccessLevel::Unlimited.usage_limits();
        assert_eq!(limits.monthly_limit, UNLIMITED);

        for _ in 0..25 {
            assert!(matches!(
                repo.reserve(&client, &periods, &limits).await.unwrap(),
                QuotaDecision::Reserved(_)
            ));
        }
        assert_eq!(repo.counters(&client, &periods).await.unwrap().monthly, 25);
    }

    #[tokio::test]
    async fn test_concurrent_reservations_respect_limit() {
        let repo = InMemoryUsageRepository::new();
        let client = ClientId::generate();
        let periods = QuotaPeriods::current();
        let limits = limits(10, 100);

        let handles: Vec<_> = (0..25)
            .map(|_| {
                let repo = repo.clone();
                let client = client.clone();
                let periods = periods.clone();
                tokio::spawn(async move { repo.reserve(&client, &periods, &limits).await })
            })
            .collect();

        let mut reserved = 0;
        for handle in handles {
            if let QuotaDecision::Reserved(_) = handle.await.unwrap().unwrap() {
                reserved += 1;
            }
        }

        assert_eq!(reserved, 10);
    }

    #[tokio::test]
    async fn test_release_undoes_reservation() {
        let repo = InMemoryUsageRepository::new();
        let client = ClientId::generate();
        let periods = QuotaPeriods::current();

        let reservation = repo
            .reserve(&client, &periods, &limits(5, 5))
            .await
            .unwrap()
            .into_result()
            .unwrap();
        repo.release(&reservation).await.unwrap();

        assert_eq!(
            repo.counters(&client, &periods).await.unwrap(),
            QuotaCounters::default()
        );
    }

    #[tokio::test]
    async fn test_record_and_delete() {
        let repo = InMemoryUsageRepository::new();
        let client = ClientId::generate();

        repo.record(&client, UsageOutcome::Success, Utc::now()).await.unwrap();
        repo.record(&client, UsageOutcome::Failure, Utc::now()).await.unwrap();

        let stats = repo.stats(&client).await.unwrap();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.failed_requests, 1);

        repo.delete(&client).await.unwrap();
        assert_eq!(repo.stats(&client).await.unwrap(), UsageStats::default());
    }
}
