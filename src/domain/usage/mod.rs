//! Usage accounting domain
//!
//! Quota counters are reserved before a provider call; statistics are
//! recorded once the call has an outcome.

mod quota;
mod repository;
mod stats;

pub use quota::{QuotaCounters, QuotaDecision, QuotaPeriods, QuotaReservation};
pub use repository::UsageRepository;
pub use stats::{
    day_key, month_key, UsageOutcome, UsageStats, UsageSummary, USAGE_RETENTION_SECS,
};
