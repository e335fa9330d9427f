//! Request rate limiting
//!
//! Limits are counted per subject (client address) and action. The in-process
//! limiter keeps a sliding window of timestamps; the Redis limiter uses a
//! fixed window counter so several gateway instances share one budget.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::Script;
use tokio::sync::RwLock;

use crate::config::RateLimitsConfig;
use crate::domain::DomainError;
use crate::infrastructure::cache::RedisStore;

/// A named request budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatePolicy {
    pub action: &'static str,
    pub limit: u32,
    pub window: Duration,
}

impl RatePolicy {
    pub fn per_minute(action: &'static str, limit: u32) -> Self {
        Self {
            action,
            limit,
            window: Duration::from_secs(60),
        }
    }

    /// Generation endpoints
    pub fn api(config: &RateLimitsConfig) -> Self {
        Self::per_minute("api", config.api_per_minute)
    }

    /// Login attempts
    pub fn auth(config: &RateLimitsConfig) -> Self {
        Self::per_minute("auth", config.auth_per_minute)
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    /// Seconds until a new request would be admitted
    pub reset_in_seconds: u64,
}

impl RateLimitResult {
    fn allowed(limit: u32, used: u32, reset_in_seconds: u64) -> Self {
        Self {
            allowed: true,
            remaining: limit.saturating_sub(used),
            limit,
            reset_in_seconds,
        }
    }

    fn denied(limit: u32, reset_in_seconds: u64) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            limit,
            reset_in_seconds: reset_in_seconds.max(1),
        }
    }

    pub fn message(&self) -> String {
        format!(
            "Rate limit exceeded. Retry in {} seconds",
            self.reset_in_seconds
        )
    }
}

#[async_trait]
pub trait RateLimiter: Send + Sync + Debug {
    /// Count one request for `subject` and report whether it is admitted.
    /// Denied requests are not counted.
    async fn check_and_record(
        &self,
        subject: &str,
        policy: &RatePolicy,
    ) -> Result<RateLimitResult, DomainError>;
}

fn bucket(subject: &str, policy: &RatePolicy) -> String {
    format!("rate:{}:{}", subject, policy.action)
}

/// Sliding window limiter held in process memory
#[derive(Debug)]
pub struct SlidingWindowRateLimiter {
    records: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    cleanup_interval: Duration,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl SlidingWindowRateLimiter {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            cleanup_interval: Duration::from_secs(300),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    async fn maybe_cleanup(&self, window: Duration) {
        let due = self.last_cleanup.read().await.elapsed() >= self.cleanup_interval;
        if !due {
            return;
        }

        *self.last_cleanup.write().await = Instant::now();

        let now = Instant::now();
        let mut records = self.records.write().await;
        for hits in records.values_mut() {
            hits.retain(|t| now.duration_since(*t) < window);
        }
        records.retain(|_, hits| !hits.is_empty());
    }
}

impl Default for SlidingWindowRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateLimiter for SlidingWindowRateLimiter {
    async fn check_and_record(
        &self,
        subject: &str,
        policy: &RatePolicy,
    ) -> Result<RateLimitResult, DomainError> {
        self.maybe_cleanup(policy.window).await;

        let now = Instant::now();
        let mut records = self.records.write().await;
        let hits = records.entry(bucket(subject, policy)).or_default();
        hits.retain(|t| now.duration_since(*t) < policy.window);

        let used = hits.len() as u32;
        if used >= policy.limit {
            let reset_in = hits
                .iter()
                .min()
                .map(|oldest| {
                    policy
                        .window
                        .saturating_sub(now.duration_since(*oldest))
                        .as_secs()
                })
                .unwrap_or(policy.window.as_secs());

            return Ok(RateLimitResult::denied(policy.limit, reset_in));
        }

        hits.push(now);
        Ok(RateLimitResult::allowed(
            policy.limit,
            used + 1,
            policy.window.as_secs(),
        ))
    }
}

/// KEYS: window counter. ARGV: limit, window seconds.
/// Returns `{allowed, count, ttl}`. A denied hit leaves the counter alone; a
/// counter found without expiry gets the window again.
static FIXED_WINDOW_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
        local count = tonumber(redis.call('GET', KEYS[1]) or '0')
        local window = tonumber(ARGV[2])

        if count >= tonumber(ARGV[1]) then
            local ttl = redis.call('TTL', KEYS[1])
            if ttl < 0 then
                redis.call('EXPIRE', KEYS[1], window)
                ttl = window
            end
            return {0, count, ttl}
        end

        count = redis.call('INCR', KEYS[1])
        local ttl = redis.call('TTL', KEYS[1])
        if ttl < 0 then
            redis.call('EXPIRE', KEYS[1], window)
            ttl = window
        end
        return {1, count, ttl}
        "#,
    )
});

/// Fixed window counter in Redis under `rate:{subject}:{action}`, expiring
/// one window after the first hit
#[derive(Debug, Clone)]
pub struct RedisRateLimiter {
    store: RedisStore,
}

impl RedisRateLimiter {
    pub fn new(store: RedisStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn check_and_record(
        &self,
        subject: &str,
        policy: &RatePolicy,
    ) -> Result<RateLimitResult, DomainError> {
        let mut conn = self.store.connection();
        let (allowed, count, reset_in): (i64, i64, i64) = FIXED_WINDOW_SCRIPT
            .key(bucket(subject, policy))
            .arg(policy.limit)
            .arg(policy.window.as_secs().max(1))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to check rate limit: {}", e)))?;

        let reset_in = reset_in.max(0) as u64;
        if allowed == 0 {
            return Ok(RateLimitResult::denied(policy.limit, reset_in));
        }

        Ok(RateLimitResult::allowed(policy.limit, count as u32, reset_in))
    }
}
