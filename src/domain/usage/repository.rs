//! Usage repository trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::quota::{QuotaCounters, QuotaDecision, QuotaPeriods, QuotaReservation};
use super::stats::{UsageOutcome, UsageStats};
use crate::domain::api_key::{ClientId, UsageLimits};
use crate::domain::DomainError;

/// Storage for quota counters and usage statistics
#[async_trait]
pub trait UsageRepository: Send + Sync + Debug {
    /// Atomically count one request against the monthly and daily quotas.
    ///
    /// If either incremented value would exceed its limit nothing is counted
    /// and the decision is `Denied`. Unlimited dimensions are counted but
    /// never deny.
    async fn reserve(
        &self,
        client_id: &ClientId,
        periods: &QuotaPeriods,
        limits: &UsageLimits,
    ) -> Result<QuotaDecision, DomainError>;

    /// Undo a reservation whose request never reached a provider
    async fn release(&self, reservation: &QuotaReservation) -> Result<(), DomainError>;

    async fn counters(
        &self,
        client_id: &ClientId,
        periods: &QuotaPeriods,
    ) -> Result<QuotaCounters, DomainError>;

    async fn record(
        &self,
        client_id: &ClientId,
        outcome: UsageOutcome,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError>;

    /// Counters for a client; a client with no history gets zeroes
    async fn stats(&self, client_id: &ClientId) -> Result<UsageStats, DomainError>;

    async fn delete(&self, client_id: &ClientId) -> Result<(), DomainError>;
}
