//! Metered execution of catalog business models

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::config::GenerationTarget;
use crate::domain::usage::UsageOutcome;
use crate::domain::{Catalog, ClientId, DomainError};
use crate::infrastructure::api_key::{ApiKeyService, ConcurrencyLimiter};
use crate::infrastructure::llm::{GenerationParams, ProviderDispatcher};
use crate::infrastructure::usage::UsageTrackingService;

const EXECUTE_MAX_TOKENS: u32 = 4000;
const EXECUTE_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct ExecuteRequest {
    pub category: String,
    pub model: String,
    pub data: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteResult {
    /// Display name of the business model
    pub model: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BusinessModelService {
    keys: ApiKeyService,
    usage: UsageTrackingService,
    concurrency: Arc<ConcurrencyLimiter>,
    dispatcher: Arc<ProviderDispatcher>,
    target: GenerationTarget,
    catalog: &'static Catalog,
}

impl BusinessModelService {
    pub fn new(
        keys: ApiKeyService,
        usage: UsageTrackingService,
        concurrency: Arc<ConcurrencyLimiter>,
        dispatcher: Arc<ProviderDispatcher>,
        target: GenerationTarget,
    ) -> Self {
        Self {
            keys,
            usage,
            concurrency,
            dispatcher,
            target,
            catalog: Catalog::global(),
        }
    }

    pub fn catalog(&self) -> &'static Catalog {
        self.catalog
    }

    /// Drop per-client execution state once a key is deleted
    pub async fn forget_client(&self, client_id: &ClientId) {
        self.concurrency.forget(client_id).await;
    }

    async fn record(&self, client_id: &ClientId, outcome: UsageOutcome) {
        if let Err(e) = self.usage.record(client_id, outcome).await {
            warn!(client_id = %client_id, outcome = ?outcome, error = %e, "Failed to record usage");
        }
    }

    /// Validate the key, reserve quota, hold a concurrency slot and run the
    /// model. The reservation stands even if the provider call fails.
    pub async fn execute(
        &self,
        api_key: &str,
        request: ExecuteRequest,
    ) -> Result<ExecuteResult, DomainError> {
        let validation = self.keys.validate(api_key, &request.model).await?;
        let client_id = validation.client_id;
        let limits = validation.usage_limits;

        let model = self.catalog.find(&request.category, &request.model)?;

        let reservation = self
            .usage
            .reserve(&client_id, &limits)
            .await?
            .map_err(DomainError::from)?;

        let _permit = match self
            .concurrency
            .try_acquire(&client_id, limits.concurrent_requests)
            .await
        {
            Ok(permit) => permit,
            Err(rejection) => {
                self.usage.release(&reservation).await?;
                return Err(rejection.into());
            }
        };

        let resolved = self
            .dispatcher
            .select_target(self.target.provider.as_deref(), self.target.model.as_deref())?;

        let params = GenerationParams::default()
            .with_system(model.system_prompt())
            .with_max_tokens(EXECUTE_MAX_TOKENS.min(limits.max_tokens_per_request))
            .with_temperature(EXECUTE_TEMPERATURE);

        let outcome = self
            .dispatcher
            .generate_with(&resolved, &model.user_prompt(&request.data), params)
            .await;

        match outcome {
            Ok(generation) => {
                self.record(&client_id, UsageOutcome::Success).await;
                info!(
                    client_id = %client_id,
                    model = %request.model,
                    provider = %generation.provider,
                    "Business model executed"
                );

                Ok(ExecuteResult {
                    model: model.name.clone(),
                    content: generation.content,
                    timestamp: Utc::now(),
                })
            }
            Err(e) => {
                self.record(&client_id, UsageOutcome::Failure).await;
                error!(client_id = %client_id, model = %request.model, error = %e, "Business model execution failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::{AccessLevel, ApiKeyRejection, MockApiKeyRepository};
    use crate::domain::llm::MockLlmProvider;
    use crate::domain::ProviderKind;
    use crate::domain::usage::{
        QuotaCounters, QuotaDecision, QuotaPeriods, QuotaReservation, UsageRepository, UsageStats,
    };
    use crate::domain::UsageLimits;
    use crate::infrastructure::api_key::IssueKeyRequest;
    use crate::infrastructure::usage::InMemoryUsageRepository;
    use async_trait::async_trait;
    use serde_json::json;

    /// Counts quota normally but cannot write usage statistics
    #[derive(Debug, Default)]
    struct StatsUnavailable {
        inner: InMemoryUsageRepository,
    }

    #[async_trait]
    impl UsageRepository for StatsUnavailable {
        async fn reserve(
            &self,
            client_id: &ClientId,
            periods: &QuotaPeriods,
            limits: &UsageLimits,
        ) -> Result<QuotaDecision, DomainError> {
            self.inner.reserve(client_id, periods, limits).await
        }

        async fn release(&self, reservation: &QuotaReservation) -> Result<(), DomainError> {
            self.inner.release(reservation).await
        }

        async fn counters(
            &self,
            client_id: &ClientId,
            periods: &QuotaPeriods,
        ) -> Result<QuotaCounters, DomainError> {
            self.inner.counters(client_id, periods).await
        }

        async fn record(
            &self,
            _client_id: &ClientId,
            _outcome: UsageOutcome,
            _at: DateTime<Utc>,
        ) -> Result<(), DomainError> {
            Err(DomainError::cache("usage store down"))
        }

        async fn stats(&self, client_id: &ClientId) -> Result<UsageStats, DomainError> {
            self.inner.stats(client_id).await
        }

        async fn delete(&self, client_id: &ClientId) -> Result<(), DomainError> {
            self.inner.delete(client_id).await
        }
    }

    struct Fixture {
        service: BusinessModelService,
        keys: ApiKeyService,
        usage: UsageTrackingService,
        concurrency: Arc<ConcurrencyLimiter>,
        provider: Arc<MockLlmProvider>,
    }

    fn fixture(provider: MockLlmProvider) -> Fixture {
        fixture_with(provider, Arc::new(InMemoryUsageRepository::new()))
    }

    fn fixture_with(provider: MockLlmProvider, usage: Arc<dyn UsageRepository>) -> Fixture {
        let provider = Arc::new(provider);
        let usage = UsageTrackingService::new(usage);
        let keys = ApiKeyService::new(Arc::new(MockApiKeyRepository::new()), usage.clone());
        let dispatcher = Arc::new(
            ProviderDispatcher::new(ProviderKind::Llama)
                .with_provider(ProviderKind::Llama, provider.clone()),
        );
        let concurrency = Arc::new(ConcurrencyLimiter::new());
        let service = BusinessModelService::new(
            keys.clone(),
            usage.clone(),
            concurrency.clone(),
            dispatcher,
            GenerationTarget::default(),
        );

        Fixture {
            service,
            keys,
            usage,
            concurrency,
            provider,
        }
    }

    fn request(model: &str) -> ExecuteRequest {
        ExecuteRequest {
            category: "project_managers".to_string(),
            model: model.to_string(),
            data: json!({"task": "plan a sprint"}),
        }
    }

    #[tokio::test]
    async fn test_execute_success() {
        let f = fixture(MockLlmProvider::new("llama").with_reply("Sprint plan"));
        let issued = f
            .keys
            .issue(IssueKeyRequest::new("software_pm", AccessLevel::Basic))
            .await
            .unwrap();

        let result = f
            .service
            .execute(&issued.api_key, request("software_pm"))
            .await
            .unwrap();

        assert_eq!(result.content, "Sprint plan");
        let expected_name = Catalog::global()
            .find("project_managers", "software_pm")
            .unwrap()
            .name
            .clone();
        assert_eq!(result.model, expected_name);

        let (_, llm_request) = f.provider.last_request().unwrap();
        assert_eq!(llm_request.max_tokens, Some(2000));
        assert_eq!(llm_request.temperature, Some(0.3));
        assert!(llm_request.messages[0].content.starts_with("You are a professional"));
        assert_eq!(llm_request.messages[1].content, r#"{"task":"plan a sprint"}"#);

        let stats = f.usage.stats(issued.record.id()).await.unwrap();
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(f.usage.counters(issued.record.id()).await.unwrap().monthly, 1);
    }

    #[tokio::test]
    async fn test_token_cap_is_min_of_key_and_ceiling() {
        let f = fixture(MockLlmProvider::new("llama").with_reply("ok"));
        let issued = f
            .keys
            .issue(IssueKeyRequest::new("software_pm", AccessLevel::Enterprise))
            .await
            .unwrap();

        f.service
            .execute(&issued.api_key, request("software_pm"))
            .await
            .unwrap();

        let (_, llm_request) = f.provider.last_request().unwrap();
        assert_eq!(llm_request.max_tokens, Some(4000));
    }

    #[tokio::test]
    async fn test_provider_failure_is_recorded() {
        let f = fixture(MockLlmProvider::new("llama").with_error("upstream down"));
        let issued = f
            .keys
            .issue(IssueKeyRequest::new("software_pm", AccessLevel::Basic))
            .await
            .unwrap();

        let err = f
            .service
            .execute(&issued.api_key, request("software_pm"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));

        let stats = f.usage.stats(issued.record.id()).await.unwrap();
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(f.usage.counters(issued.record.id()).await.unwrap().monthly, 1);
    }

    #[tokio::test]
    async fn test_unknown_category_is_not_found() {
        let f = fixture(MockLlmProvider::new("llama").with_reply("ok"));
        let issued = f
            .keys
            .issue(IssueKeyRequest::new("software_pm", AccessLevel::Basic))
            .await
            .unwrap();

        let mut req = request("software_pm");
        req.category = "wizards".to_string();

        let err = f.service.execute(&issued.api_key, req).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(err.message(), "Model category wizards not found");
        assert!(f.provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_model_is_forbidden() {
        let f = fixture(MockLlmProvider::new("llama").with_reply("ok"));
        let issued = f
            .keys
            .issue(IssueKeyRequest::new("software_pm", AccessLevel::Basic))
            .await
            .unwrap();

        let err = f
            .service
            .execute(&issued.api_key, request("healthcare_pm"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden { .. }));
        assert_eq!(err.message(), ApiKeyRejection::ModelNotAuthorized.to_string());
    }

    #[tokio::test]
    async fn test_daily_quota_enforced() {
        let f = fixture(MockLlmProvider::new("llama").with_reply("ok"));
        let issued = f
            .keys
            .issue(IssueKeyRequest::new("software_pm", AccessLevel::Basic))
            .await
            .unwrap();

        for _ in 0..50 {
            f.service
                .execute(&issued.api_key, request("software_pm"))
                .await
                .unwrap();
        }

        let err = f
            .service
            .execute(&issued.api_key, request("software_pm"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::QuotaExceeded { .. }));
        assert_eq!(f.provider.requests().len(), 50);
    }

    #[tokio::test]
    async fn test_concurrency_limit_releases_reservation() {
        let f = fixture(MockLlmProvider::new("llama").with_reply("ok"));
        let issued = f
            .keys
            .issue(IssueKeyRequest::new("software_pm", AccessLevel::Basic))
            .await
            .unwrap();
        let client_id = issued.record.id().clone();
        let capacity = issued.record.usage_limits().concurrent_requests;

        let mut held = Vec::new();
        for _ in 0..capacity {
            held.push(f.concurrency.try_acquire(&client_id, capacity).await.unwrap());
        }

        let err = f
            .service
            .execute(&issued.api_key, request("software_pm"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::QuotaExceeded { .. }));
        assert_eq!(err.message(), ApiKeyRejection::ConcurrencyLimitExceeded.to_string());
        assert!(f.provider.requests().is_empty());
        assert_eq!(f.usage.counters(&client_id).await.unwrap(), QuotaCounters::default());

        drop(held);
        assert!(f
            .service
            .execute(&issued.api_key, request("software_pm"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_forget_client_drops_held_slots() {
        let f = fixture(MockLlmProvider::new("llama").with_reply("ok"));
        let issued = f
            .keys
            .issue(IssueKeyRequest::new("software_pm", AccessLevel::Basic))
            .await
            .unwrap();
        let client_id = issued.record.id().clone();
        let capacity = issued.record.usage_limits().concurrent_requests;

        let mut held = Vec::new();
        for _ in 0..capacity {
            held.push(f.concurrency.try_acquire(&client_id, capacity).await.unwrap());
        }
        assert!(f.concurrency.try_acquire(&client_id, capacity).await.is_err());

        f.service.forget_client(&client_id).await;

        assert!(f.concurrency.try_acquire(&client_id, capacity).await.is_ok());
    }

    #[tokio::test]
    async fn test_usage_store_failure_keeps_provider_error() {
        let f = fixture_with(
            MockLlmProvider::new("llama").with_error("upstream down"),
            Arc::new(StatsUnavailable::default()),
        );
        let issued = f
            .keys
            .issue(IssueKeyRequest::new("software_pm", AccessLevel::Basic))
            .await
            .unwrap();

        let err = f
            .service
            .execute(&issued.api_key, request("software_pm"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Provider { .. }));
        assert!(err.message().contains("upstream down"));
    }

    #[tokio::test]
    async fn test_usage_store_failure_keeps_result() {
        let f = fixture_with(
            MockLlmProvider::new("llama").with_reply("Sprint plan"),
            Arc::new(StatsUnavailable::default()),
        );
        let issued = f
            .keys
            .issue(IssueKeyRequest::new("software_pm", AccessLevel::Basic))
            .await
            .unwrap();

        let result = f
            .service
            .execute(&issued.api_key, request("software_pm"))
            .await
            .unwrap();
        assert_eq!(result.content, "Sprint plan");
        assert_eq!(f.usage.counters(issued.record.id()).await.unwrap().monthly, 1);
    }
}
