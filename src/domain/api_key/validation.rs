//! Outcome of checking an API key against a request

use serde::Serialize;
use thiserror::Error;

use super::access_level::{AccessLevel, UsageLimits};
use super::entity::ClientId;
use crate::domain::DomainError;

/// Why a key was refused. Variants are listed in the order they are checked.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyRejection {
    #[error("Invalid API key")]
    InvalidKey,

    #[error("API key is inactive")]
    Inactive,

    #[error("API key has expired")]
    Expired,

    #[error("Model access not authorized")]
    ModelNotAuthorized,

    #[error("Monthly usage limit exceeded")]
    MonthlyLimitExceeded,

    #[error("Daily usage limit exceeded")]
    DailyLimitExceeded,

    #[error("Concurrent request limit exceeded")]
    ConcurrencyLimitExceeded,
}

impl ApiKeyRejection {
    /// HTTP status code the rejection is reported with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidKey => 401,
            Self::Inactive | Self::Expired | Self::ModelNotAuthorized => 403,
            Self::MonthlyLimitExceeded
            | Self::DailyLimitExceeded
            | Self::ConcurrencyLimitExceeded => 429,
        }
    }
}

impl From<ApiKeyRejection> for DomainError {
    fn from(rejection: ApiKeyRejection) -> Self {
        let message = rejection.to_string();
        match rejection.status_code() {
            401 => DomainError::unauthorized(message),
            403 => DomainError::forbidden(message),
            _ => DomainError::quota_exceeded(message),
        }
    }
}

/// A key that passed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValidation {
    pub client_id: ClientId,
    pub access_level: AccessLevel,
    pub usage_limits: UsageLimits,
    /// `None` when the monthly quota is unlimited
    pub remaining_requests: Option<i64>,
}
