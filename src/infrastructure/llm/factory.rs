use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::http_client::HttpClient;
use super::{AnthropicProvider, HuggingFaceProvider, OpenAiProvider, ProviderDispatcher};
use crate::config::ProvidersConfig;
use crate::domain::{DomainError, ImageGenerator, ProviderKind};

/// Everything built from the providers section
#[derive(Debug)]
pub struct ProviderSet {
    pub dispatcher: ProviderDispatcher,
    /// DALL-E, present when OpenAI is configured
    pub image_generator: Option<Arc<dyn ImageGenerator>>,
}

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    /// Build every provider that has credentials, plus the dispatcher over them
    pub fn from_config(config: &ProvidersConfig) -> Result<ProviderSet, DomainError> {
        let default_kind: ProviderKind = config.default.parse().map_err(|_| {
            DomainError::configuration(format!("Unknown default provider: {}", config.default))
        })?;

        let client = HttpClient::with_timeout(Duration::from_secs(config.timeout_secs))?;
        let mut dispatcher = ProviderDispatcher::new(default_kind);
        let mut image_generator: Option<Arc<dyn ImageGenerator>> = None;

        if let Some(api_key) = non_empty(&config.openai.api_key) {
            let openai = Arc::new(
                OpenAiProvider::with_base_url(client.clone(), api_key, &config.openai.base_url)
                    .with_default_model(&config.openai.model),
            );
            image_generator = Some(openai.clone());
            dispatcher = dispatcher.with_provider(ProviderKind::OpenAi, openai);
        }

        if let Some(api_key) = non_empty(&config.anthropic.api_key) {
            let anthropic = AnthropicProvider::with_base_url(
                client.clone(),
                api_key,
                &config.anthropic.base_url,
            )
            .with_default_model(&config.anthropic.model);
            dispatcher = dispatcher.with_provider(ProviderKind::Anthropic, Arc::new(anthropic));
        }

        if let Some(api_key) = non_empty(&config.llama.api_key) {
            let llama = OpenAiProvider::llama(client.clone(), api_key, &config.llama.url)
                .with_default_model(&config.llama.model);
            dispatcher = dispatcher.with_provider(ProviderKind::Llama, Arc::new(llama));
        }

        let hf_key = non_empty(&config.huggingface.api_key);
        if config.huggingface.enabled || hf_key.is_some() {
            let huggingface = HuggingFaceProvider::new(client, &config.huggingface.url)
                .with_api_key(hf_key.map(str::to_string));
            dispatcher = dispatcher.with_provider(ProviderKind::HuggingFace, Arc::new(huggingface));
        }

        info!(
            default = %default_kind,
            registered = ?dispatcher.registered(),
            images = image_generator.is_some(),
            "LLM providers configured"
        );

        Ok(ProviderSet {
            dispatcher,
            image_generator,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configured_providers_are_registered() {
        let mut config = ProvidersConfig::default();
        config.openai.api_key = Some("sk-test".to_string());
        config.huggingface.enabled = false;

        let set = LlmProviderFactory::from_config(&config).unwrap();

        assert_eq!(set.dispatcher.registered(), vec![ProviderKind::OpenAi]);
        assert_eq!(set.dispatcher.default_kind(), ProviderKind::Llama);
        assert!(set.image_generator.is_some());
    }

    #[test]
    fn test_huggingface_registered_without_key() {
        let set = LlmProviderFactory::from_config(&ProvidersConfig::default()).unwrap();
        assert_eq!(set.dispatcher.registered(), vec![ProviderKind::HuggingFace]);
        assert!(set.image_generator.is_none());
    }

    #[test]
    fn test_default_alias_is_accepted() {
        let mut config = ProvidersConfig::default();
        config.default = "claude".to_string();
        config.anthropic.api_key = Some("sk-ant".to_string());

        let set = LlmProviderFactory::from_config(&config).unwrap();
        assert_eq!(set.dispatcher.default_kind(), ProviderKind::Anthropic);
        assert!(set.dispatcher.is_registered(ProviderKind::Anthropic));
    }

    #[test]
    fn test_unknown_default_is_rejected() {
        let mut config = ProvidersConfig::default();
        config.default = "palm".to_string();

        let err = LlmProviderFactory::from_config(&config).unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[test]
    fn test_blank_key_is_not_registered() {
        let mut config = ProvidersConfig::default();
        config.llama.api_key = Some("   ".to_string());
        config.huggingface.enabled = false;

        let set = LlmProviderFactory::from_config(&config).unwrap();
        assert!(set.dispatcher.registered().is_empty());
    }
}
