//! Per-client usage counters

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Seconds a usage record survives after its last update
pub const USAGE_RETENTION_SECS: u64 = 2_592_000;

/// Result of a metered request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageOutcome {
    Success,
    Failure,
}

/// Raw counters kept for a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub last_used: Option<DateTime<Utc>>,
    /// Request count keyed by `YYYY-MM`
    #[serde(default)]
    pub monthly_usage: BTreeMap<String, u64>,
}

impl UsageStats {
    /// Apply one outcome to the counters
    pub fn apply(&mut self, outcome: UsageOutcome, at: DateTime<Utc>) {
        self.total_requests += 1;
        match outcome {
            UsageOutcome::Success => self.successful_requests += 1,
            UsageOutcome::Failure => self.failed_requests += 1,
        }
        self.last_used = Some(at);
        *self.monthly_usage.entry(month_key(at)).or_insert(0) += 1;
    }

    pub fn requests_in_month(&self, month: &str) -> u64 {
        self.monthly_usage.get(month).copied().unwrap_or(0)
    }

    pub fn summary_at(&self, now: DateTime<Utc>) -> UsageSummary {
        let success_rate =
            self.successful_requests as f64 / self.total_requests.max(1) as f64 * 100.0;

        UsageSummary {
            total_requests: self.total_requests,
            monthly_requests: self.requests_in_month(&month_key(now)),
            success_rate,
            last_used: self.last_used,
        }
    }

    pub fn summary(&self) -> UsageSummary {
        self.summary_at(Utc::now())
    }
}

/// What clients see about their usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_requests: u64,
    pub monthly_requests: u64,
    /// Percentage of successful requests
    pub success_rate: f64,
    pub last_used: Option<DateTime<Utc>>,
}

pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

pub fn day_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}
