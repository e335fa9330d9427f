//! Redis-backed usage repository
//!
//! Layout:
//! - `usage:{client_id}` hash with `total`, `success`, `failed`, `last_used`
//!   and `month:{YYYY-MM}` fields, expiring 30 days after the last write
//! - `quota:{client_id}:m:{YYYY-MM}` and `quota:{client_id}:d:{YYYY-MM-DD}`
//!   reservation counters
//!
//! Reservations run as one Lua script so both counters are checked, bumped
//! and given a TTL together.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use redis::{AsyncCommands, Script};

use crate::domain::api_key::{ApiKeyRejection, ClientId, UsageLimits};
use crate::domain::usage::{
    month_key, QuotaCounters, QuotaDecision, QuotaPeriods, QuotaReservation, UsageOutcome,
    UsageRepository, UsageStats, USAGE_RETENTION_SECS,
};
use crate::domain::DomainError;
use crate::infrastructure::cache::RedisStore;

const MONTH_COUNTER_TTL: Duration = Duration::from_secs(32 * 24 * 3600);
const DAY_COUNTER_TTL: Duration = Duration::from_secs(2 * 24 * 3600);
const MONTH_FIELD_PREFIX: &str = "month:";

/// KEYS: month counter, day counter.
/// ARGV: monthly limit, daily limit (-1 for unlimited), month TTL, day TTL.
/// Returns `{status, monthly, daily}`; status 0 reserved, 1 monthly limit
/// reached, 2 daily limit reached. Counters are only bumped when reserved.
static RESERVE_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local monthly = tonumber(redis.call('GET', KEYS[1]) or '0')
        local daily = tonumber(redis.call('GET', KEYS[2]) or '0')
        local monthly_limit = tonumber(ARGV[1])
        local daily_limit = tonumber(ARGV[2])

        if monthly_limit >= 0 and monthly + 1 > monthly_limit then
            return {1, monthly, daily}
        end
        if daily_limit >= 0 and daily + 1 > daily_limit then
            return {2, monthly, daily}
        end

        monthly = redis.call('INCR', KEYS[1])
        redis.call('EXPIRE', KEYS[1], ARGV[3])
        daily = redis.call('INCR', KEYS[2])
        redis.call('EXPIRE', KEYS[2], ARGV[4])
        return {0, monthly, daily}
        "#,
    )
});

fn limit_arg(limit: i64, unlimited: bool) -> i64 {
    if unlimited { -1 } else { limit }
}

fn usage_key(client_id: &ClientId) -> String {
    format!("usage:{}", client_id)
}

fn month_counter(client_id: &ClientId, month: &str) -> String {
    format!("quota:{}:m:{}", client_id, month)
}

fn day_counter(client_id: &ClientId, day: &str) -> String {
    format!("quota:{}:d:{}", client_id, day)
}

/// Rebuild stats from the fields of a `usage:{id}` hash
fn stats_from_fields(fields: HashMap<String, String>) -> UsageStats {
    let count = |name: &str| {
        fields
            .get(name)
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
    };

    let monthly_usage: BTreeMap<String, u64> = fields
        .iter()
        .filter_map(|(field, value)| {
            let month = field.strip_prefix(MONTH_FIELD_PREFIX)?;
            Some((month.to_string(), value.parse().ok()?))
        })
        .collect();

    UsageStats {
        total_requests: count("total"),
        successful_requests: count("success"),
        failed_requests: count("failed"),
        last_used: fields
            .get("last_used")
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|at| at.with_timezone(&Utc)),
        monthly_usage,
    }
}

#[derive(Debug, Clone)]
pub struct RedisUsageRepository {
    store: RedisStore,
}

impl RedisUsageRepository {
    pub fn new(store: RedisStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UsageRepository for RedisUsageRepository {
    async fn reserve(
        &self,
        client_id: &ClientId,
        periods: &QuotaPeriods,
        limits: &UsageLimits,
    ) -> Result<QuotaDecision, DomainError> {
        let mut conn = self.store.connection();
        let (status, monthly, daily): (i64, i64, i64) = RESERVE_SCRIPT
            .key(month_counter(client_id, &periods.month))
            .key(day_counter(client_id, &periods.day))
            .arg(limit_arg(limits.monthly_limit, limits.is_monthly_unlimited()))
            .arg(limit_arg(limits.daily_limit, limits.is_daily_unlimited()))
            .arg(MONTH_COUNTER_TTL.as_secs())
            .arg(DAY_COUNTER_TTL.as_secs())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to reserve quota: {}", e)))?;

        match status {
            0 => Ok(QuotaDecision::Reserved(QuotaReservation {
                client_id: client_id.clone(),
                periods: periods.clone(),
                counters: QuotaCounters { monthly, daily },
            })),
            1 => Ok(QuotaDecision::Denied(ApiKeyRejection::MonthlyLimitExceeded)),
            _ => Ok(QuotaDecision::Denied(ApiKeyRejection::DailyLimitExceeded)),
        }
    }

    async fn release(&self, reservation: &QuotaReservation) -> Result<(), DomainError> {
        let client_id = &reservation.client_id;
        let mut conn = self.store.connection();
        redis::pipe()
            .atomic()
            .decr(month_counter(client_id, &reservation.periods.month), 1)
            .ignore()
            .decr(day_counter(client_id, &reservation.periods.day), 1)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to release quota: {}", e)))?;
        Ok(())
    }

    async fn counters(
        &self,
        client_id: &ClientId,
        periods: &QuotaPeriods,
    ) -> Result<QuotaCounters, DomainError> {
        let read = |raw: Option<String>| {
            raw.and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(0)
                .max(0)
        };

        Ok(QuotaCounters {
            monthly: read(self.store.get(&month_counter(client_id, &periods.month)).await?),
            daily: read(self.store.get(&day_counter(client_id, &periods.day)).await?),
        })
    }

    async fn record(
        &self,
        client_id: &ClientId,
        outcome: UsageOutcome,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let key = usage_key(client_id);
        let outcome_field = match outcome {
            UsageOutcome::Success => "success",
            UsageOutcome::Failure => "failed",
        };

        let mut conn = self.store.connection();
        redis::pipe()
            .atomic()
            .hincr(&key, "total", 1)
            .ignore()
            .hincr(&key, outcome_field, 1)
            .ignore()
            .hincr(&key, format!("{}{}", MONTH_FIELD_PREFIX, month_key(at)), 1)
            .ignore()
            .hset(&key, "last_used", at.to_rfc3339())
            .ignore()
            .expire(&key, USAGE_RETENTION_SECS as i64)
            .ignore()
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to record usage: {}", e)))?;

        Ok(())
    }

    async fn stats(&self, client_id: &ClientId) -> Result<UsageStats, DomainError> {
        let mut conn = self.store.connection();
        let fields: HashMap<String, String> = conn
            .hgetall(usage_key(client_id))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to read usage: {}", e)))?;

        Ok(stats_from_fields(fields))
    }

    async fn delete(&self, client_id: &ClientId) -> Result<(), DomainError> {
        let mut keys = self
            .store
            .scan_keys(&format!("quota:{}:*", client_id))
            .await?;
        keys.push(usage_key(client_id));
        self.store.delete(&keys).await?;
        Ok(())
    }
}
