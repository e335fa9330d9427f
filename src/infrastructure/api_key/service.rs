//! API key service
//!
//! Issues keys for catalog business models, validates presented keys against
//! their status, expiry, scope and quotas, and runs the admin lifecycle.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::domain::api_key::{
    AccessLevel, ApiKeyRecord, ApiKeyRejection, ApiKeyRepository, ApiKeyStatus, ClientId,
    KeyValidation, PricingTier,
};
use crate::domain::usage::UsageSummary;
use crate::domain::{Catalog, DomainError};
use crate::infrastructure::usage::UsageTrackingService;

use super::generator::{hash_key, looks_like_key, ApiKeyGenerator};

const DOCUMENTATION_BASE_URL: &str = "https://docs.mitoai.com";

/// Input for issuing a key
#[derive(Debug, Clone)]
pub struct IssueKeyRequest {
    pub business_model: String,
    pub access_level: AccessLevel,
    /// Free-form client details; `company_name` feeds the key material
    pub client_data: Value,
}

impl IssueKeyRequest {
    pub fn new(business_model: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            business_model: business_model.into(),
            access_level,
            client_data: Value::Object(Default::default()),
        }
    }

    pub fn with_client_data(mut self, client_data: Value) -> Self {
        self.client_data = client_data;
        self
    }
}

/// A freshly issued key. `api_key` is the only copy of the plaintext.
#[derive(Debug, Clone)]
pub struct IssuedKey {
    pub api_key: String,
    pub record: ApiKeyRecord,
    pub documentation_url: String,
}

#[derive(Debug, Clone)]
pub struct ApiKeyService {
    repository: Arc<dyn ApiKeyRepository>,
    usage: UsageTrackingService,
    generator: ApiKeyGenerator,
    catalog: &'static Catalog,
}

impl ApiKeyService {
    pub fn new(repository: Arc<dyn ApiKeyRepository>, usage: UsageTrackingService) -> Self {
        Self {
            repository,
            usage,
            generator: ApiKeyGenerator::new(),
            catalog: Catalog::global(),
        }
    }

    pub async fn issue(&self, request: IssueKeyRequest) -> Result<IssuedKey, DomainError> {
        let Some(category) = self.catalog.category_of(&request.business_model) else {
            return Err(DomainError::validation(format!(
                "Unknown business model: {}",
                request.business_model
            )));
        };

        let client_id = ClientId::generate();
        let company_name = request
            .client_data
            .get("company_name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty());

        let generated = self.generator.generate(
            &client_id,
            &request.business_model,
            company_name,
            chrono::Utc::now(),
        );

        let record = ApiKeyRecord::new(
            client_id,
            generated.hash,
            generated.prefix,
            &request.business_model,
            request.access_level,
            PricingTier::for_category(Some(category), request.access_level),
        )
        .with_client_data(request.client_data);

        let record = self.repository.create(record).await?;

        info!(
            client_id = %record.id(),
            key_prefix = %record.key_prefix(),
            business_model = %record.business_model(),
            access_level = %record.access_level().as_str(),
            "API key issued"
        );

        Ok(IssuedKey {
            api_key: generated.key,
            documentation_url: format!("{}/{}", DOCUMENTATION_BASE_URL, record.business_model()),
            record,
        })
    }

    async fn find_by_key(&self, api_key: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        if !looks_like_key(api_key) {
            return Ok(None);
        }
        self.repository.get_by_hash(&hash_key(api_key)).await
    }

    /// Run the ordered checks for `api_key` calling `requested_model`.
    ///
    /// Storage failures are the outer error; a refused key is the inner one.
    pub async fn check(
        &self,
        api_key: &str,
        requested_model: &str,
    ) -> Result<Result<KeyValidation, ApiKeyRejection>, DomainError> {
        let Some(record) = self.find_by_key(api_key).await? else {
            return Ok(Err(ApiKeyRejection::InvalidKey));
        };

        let rejection = if record.status() != ApiKeyStatus::Active {
            Some(ApiKeyRejection::Inactive)
        } else if record.is_expired() {
            Some(ApiKeyRejection::Expired)
        } else if !record.authorizes(requested_model) {
            Some(ApiKeyRejection::ModelNotAuthorized)
        } else {
            None
        };

        if let Some(rejection) = rejection {
            warn!(client_id = %record.id(), reason = %rejection, "API key rejected");
            return Ok(Err(rejection));
        }

        let limits = *record.usage_limits();
        let counters = self.usage.counters(record.id()).await?;

        if !limits.is_monthly_unlimited() && counters.monthly >= limits.monthly_limit {
            return Ok(Err(ApiKeyRejection::MonthlyLimitExceeded));
        }
        if !limits.is_daily_unlimited() && counters.daily >= limits.daily_limit {
            return Ok(Err(ApiKeyRejection::DailyLimitExceeded));
        }

        debug!(client_id = %record.id(), model = requested_model, "API key validated");

        Ok(Ok(KeyValidation {
            client_id: record.id().clone(),
            access_level: record.access_level(),
            usage_limits: limits,
            remaining_requests: limits.remaining_monthly(counters.monthly),
        }))
    }

    /// `check` with the rejection folded into a `DomainError`
    pub async fn validate(
        &self,
        api_key: &str,
        requested_model: &str,
    ) -> Result<KeyValidation, DomainError> {
        self.check(api_key, requested_model)
            .await?
            .map_err(DomainError::from)
    }

    pub async fn usage(&self, api_key: &str) -> Result<UsageSummary, DomainError> {
        let record = self
            .find_by_key(api_key)
            .await?
            .ok_or_else(|| DomainError::not_found("API key not found"))?;

        self.usage.summary(record.id()).await
    }

    pub async fn list(&self, status: Option<ApiKeyStatus>) -> Result<Vec<ApiKeyRecord>, DomainError> {
        self.repository.list(status).await
    }

    pub async fn count(&self, status: Option<ApiKeyStatus>) -> Result<usize, DomainError> {
        self.repository.count(status).await
    }

    pub async fn get(&self, client_id: &ClientId) -> Result<ApiKeyRecord, DomainError> {
        self.repository
            .get(client_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("API key for client '{}' not found", client_id)))
    }

    pub async fn suspend(&self, client_id: &ClientId) -> Result<ApiKeyRecord, DomainError> {
        let mut record = self.get(client_id).await?;
        record.suspend();
        let record = self.repository.update(&record).await?;

        info!(client_id = %client_id, "API key suspended");
        Ok(record)
    }

    pub async fn activate(&self, client_id: &ClientId) -> Result<ApiKeyRecord, DomainError> {
        let mut record = self.get(client_id).await?;
        if !record.activate() {
            return Err(DomainError::validation("Revoked API keys cannot be reactivated"));
        }
        let record = self.repository.update(&record).await?;

        info!(client_id = %client_id, "API key activated");
        Ok(record)
    }

    pub async fn revoke(&self, client_id: &ClientId) -> Result<ApiKeyRecord, DomainError> {
        let mut record = self.get(client_id).await?;
        record.revoke();
        let record = self.repository.update(&record).await?;

        info!(client_id = %client_id, "API key revoked");
        Ok(record)
    }

    /// Remove the record and its usage history
    pub async fn delete(&self, client_id: &ClientId) -> Result<(), DomainError> {
        if !self.repository.delete(client_id).await? {
            return Err(DomainError::not_found(format!(
                "API key for client '{}' not found",
                client_id
            )));
        }
        self.usage.delete(client_id).await?;

        info!(client_id = %client_id, "API key deleted");
        Ok(())
    }
}
