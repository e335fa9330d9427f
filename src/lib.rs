//! MitoAI Gateway
//!
//! An AI gateway that provides:
//! - Text generation over OpenAI, Anthropic, Llama and HuggingFace
//! - Content, image and operator endpoints
//! - Metered API keys for a catalog of business models
//! - Project initialization with industry project managers

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use api::state::{AppState, Backends};
use config::{KeyStoreBackend, ProjectStoreBackend};
use domain::{ApiKeyRepository, Project, Storage, UsageRepository};
use infrastructure::{
    api_key::{
        InMemoryApiKeyRepository, RateLimiter, RedisApiKeyRepository, RedisRateLimiter,
        SlidingWindowRateLimiter,
    },
    auth::AdminAuthService,
    cache::RedisStore,
    llm::LlmProviderFactory,
    storage::{InMemoryStorage, PostgresStorage},
    usage::{InMemoryUsageRepository, RedisUsageRepository},
};

const PROJECTS_TABLE: &str = "projects";

/// Create application state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let providers = LlmProviderFactory::from_config(&config.providers)?;

    let (api_keys, usage, rate_limiter): (
        Arc<dyn ApiKeyRepository>,
        Arc<dyn UsageRepository>,
        Arc<dyn RateLimiter>,
    ) = match config.storage.keys {
        KeyStoreBackend::Memory => {
            info!("Using in-memory key storage");
            (
                Arc::new(InMemoryApiKeyRepository::new()),
                Arc::new(InMemoryUsageRepository::new()),
                Arc::new(SlidingWindowRateLimiter::new()),
            )
        }
        KeyStoreBackend::Redis => {
            let url = config
                .storage
                .redis_url
                .as_deref()
                .context("storage.redis_url is required for the redis key store")?;
            let store = RedisStore::connect(url).await?;
            info!("Using Redis key storage");
            (
                Arc::new(RedisApiKeyRepository::new(store.clone())),
                Arc::new(RedisUsageRepository::new(store.clone())),
                Arc::new(RedisRateLimiter::new(store)),
            )
        }
    };

    let projects: Arc<dyn Storage<Project>> = match config.storage.projects {
        ProjectStoreBackend::Memory => Arc::new(InMemoryStorage::<Project>::new()),
        ProjectStoreBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .context("storage.database_url is required for the postgres project store")?;
            let storage = PostgresStorage::<Project>::connect(
                url,
                config.storage.max_connections,
                PROJECTS_TABLE,
            )
            .await?;
            info!("Using PostgreSQL project storage");
            Arc::new(storage)
        }
    };

    Ok(AppState::new(
        config,
        Backends {
            dispatcher: providers.dispatcher,
            image_generator: providers.image_generator,
            api_keys,
            usage,
            rate_limiter,
            projects,
            admin_auth: AdminAuthService::from_config(&config.auth),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_config_builds_in_memory_state() {
        let state = tokio_test::assert_ok!(create_app_state(&AppConfig::default()).await);

        assert_eq!(state.api_keys.count(None).await.unwrap(), 0);
        assert_eq!(state.projects.count().await.unwrap(), 0);
        assert!(!state.admin_auth.is_enabled());
    }

    #[tokio::test]
    async fn test_redis_backend_requires_url() {
        let mut config = AppConfig::default();
        config.storage.keys = KeyStoreBackend::Redis;
        config.storage.redis_url = None;

        let err = create_app_state(&config).await.unwrap_err();
        assert!(err.to_string().contains("storage.redis_url"));
    }

    #[tokio::test]
    async fn test_unknown_default_provider_fails() {
        let mut config = AppConfig::default();
        config.providers.default = "gemini".to_string();

        assert!(create_app_state(&config).await.is_err());
    }
}
