//! Quota reservation types

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::stats::{day_key, month_key};
use crate::domain::api_key::{ApiKeyRejection, ClientId};

/// Month and day buckets a request is counted in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaPeriods {
    pub month: String,
    pub day: String,
}

impl QuotaPeriods {
    pub fn at(at: DateTime<Utc>) -> Self {
        Self {
            month: month_key(at),
            day: day_key(at),
        }
    }

    pub fn current() -> Self {
        Self::at(Utc::now())
    }
}

/// Current values of the quota counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuotaCounters {
    pub monthly: i64,
    pub daily: i64,
}

/// Increments taken ahead of a provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaReservation {
    pub client_id: ClientId,
    pub periods: QuotaPeriods,
    /// Counter values after the increment
    pub counters: QuotaCounters,
}

/// Result of trying to reserve quota
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    Reserved(QuotaReservation),
    Denied(ApiKeyRejection),
}

impl QuotaDecision {
    pub fn into_result(self) -> Result<QuotaReservation, ApiKeyRejection> {
        match self {
            Self::Reserved(reservation) => Ok(reservation),
            Self::Denied(rejection) => Err(rejection),
        }
    }
}
