//! Application state for shared services

use std::sync::Arc;

use crate::config::{AppConfig, RateLimitsConfig};
use crate::domain::{ApiKeyRepository, ImageGenerator, Project, Storage, UsageRepository};
use crate::infrastructure::api_key::{ApiKeyService, ConcurrencyLimiter, RateLimiter};
use crate::infrastructure::auth::AdminAuthService;
use crate::infrastructure::llm::ProviderDispatcher;
use crate::infrastructure::services::{
    BusinessModelService, ContentService, OperatorService, ProjectService,
};
use crate::infrastructure::usage::UsageTrackingService;

pub const PLATFORM_NAME: &str = "MitoAI Gateway";

/// Storage and provider backends chosen at startup
#[derive(Debug)]
pub struct Backends {
    pub dispatcher: ProviderDispatcher,
    pub image_generator: Option<Arc<dyn ImageGenerator>>,
    pub api_keys: Arc<dyn ApiKeyRepository>,
    pub usage: Arc<dyn UsageRepository>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub projects: Arc<dyn Storage<Project>>,
    pub admin_auth: AdminAuthService,
}

/// Everything handlers need, cheap to clone
#[derive(Debug, Clone)]
pub struct AppState {
    pub dispatcher: Arc<ProviderDispatcher>,
    pub api_keys: ApiKeyService,
    pub business_models: BusinessModelService,
    pub content: ContentService,
    pub operator: OperatorService,
    pub projects: ProjectService,
    pub admin_auth: Arc<AdminAuthService>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub rate_limits: RateLimitsConfig,
    pub trust_forwarded_for: bool,
}

impl AppState {
    /// Wire the services over the given backends
    pub fn new(config: &AppConfig, backends: Backends) -> Self {
        let dispatcher = Arc::new(backends.dispatcher);
        let usage = UsageTrackingService::new(backends.usage);
        let api_keys = ApiKeyService::new(backends.api_keys, usage.clone());

        let business_models = BusinessModelService::new(
            api_keys.clone(),
            usage,
            Arc::new(ConcurrencyLimiter::new()),
            dispatcher.clone(),
            config.generation.business_models.clone(),
        );
        let content = ContentService::new(
            dispatcher.clone(),
            backends.image_generator,
            config.generation.content.clone(),
        );
        let operator = OperatorService::new(
            dispatcher.clone(),
            content.clone(),
            config.generation.intent.clone(),
        );
        let projects = ProjectService::new(backends.projects, dispatcher.clone());

        Self {
            dispatcher,
            api_keys,
            business_models,
            content,
            operator,
            projects,
            admin_auth: Arc::new(backends.admin_auth),
            rate_limiter: backends.rate_limiter,
            rate_limits: config.rate_limits.clone(),
            trust_forwarded_for: config.server.trust_forwarded_for,
        }
    }
}
