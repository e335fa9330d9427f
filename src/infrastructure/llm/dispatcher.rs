//! Routes generation requests to a registered provider

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{
    DomainError, LlmProvider, LlmRequest, ProviderKind, ProviderResolver, ResolvedProvider,
    Usage,
};

/// Sampling parameters for a one-shot generation
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub system: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            system: None,
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

impl GenerationParams {
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Text produced by a provider
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub provider: ProviderKind,
    pub model: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug)]
pub struct ProviderDispatcher {
    providers: BTreeMap<ProviderKind, Arc<dyn LlmProvider>>,
    default_kind: ProviderKind,
}

impl ProviderDispatcher {
    pub fn new(default_kind: ProviderKind) -> Self {
        Self {
            providers: BTreeMap::new(),
            default_kind,
        }
    }

    pub fn with_provider(mut self, kind: ProviderKind, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    pub fn default_kind(&self) -> ProviderKind {
        self.default_kind
    }

    pub fn registered(&self) -> Vec<ProviderKind> {
        self.providers.keys().copied().collect()
    }

    pub fn is_registered(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    fn default_provider(&self) -> Result<ResolvedProvider, DomainError> {
        self.providers
            .get(&self.default_kind)
            .map(|provider| ResolvedProvider {
                kind: self.default_kind,
                provider: provider.clone(),
                model: provider.default_model().to_string(),
            })
            .ok_or_else(|| {
                DomainError::configuration(format!(
                    "Default provider '{}' is not configured",
                    self.default_kind
                ))
            })
    }

    /// Select a provider by name, falling back to the default
    pub fn select(&self, name: Option<&str>) -> Result<ResolvedProvider, DomainError> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return self.default_provider();
        };

        match name.parse::<ProviderKind>() {
            Ok(kind) => match self.providers.get(&kind) {
                Some(provider) => Ok(ResolvedProvider {
                    kind,
                    provider: provider.clone(),
                    model: provider.default_model().to_string(),
                }),
                None => {
                    warn!(
                        requested = %kind,
                        default = %self.default_kind,
                        "Requested provider is not configured, using default"
                    );
                    self.default_provider()
                }
            },
            Err(_) => {
                warn!(
                    requested = name,
                    default = %self.default_kind,
                    "Unknown provider requested, using default"
                );
                self.default_provider()
            }
        }
    }

    /// Select a provider and apply `model` only if that provider actually serves the call
    pub fn select_target(
        &self,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Result<ResolvedProvider, DomainError> {
        let mut resolved = self.select(provider)?;

        let requested_kind = provider.and_then(|p| p.parse::<ProviderKind>().ok());
        let served_as_requested = match requested_kind {
            Some(kind) => kind == resolved.kind,
            None => provider.is_none(),
        };

        if let Some(model) = model.filter(|_| served_as_requested) {
            resolved.model = model.to_string();
        }

        Ok(resolved)
    }

    /// One user prompt in, text out
    pub async fn generate(
        &self,
        provider: Option<&str>,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<Generation, DomainError> {
        let resolved = self.select(provider)?;
        self.generate_with(&resolved, prompt, params).await
    }

    pub async fn generate_with(
        &self,
        resolved: &ResolvedProvider,
        prompt: &str,
        params: GenerationParams,
    ) -> Result<Generation, DomainError> {
        let mut builder = LlmRequest::builder();
        if let Some(system) = params.system {
            builder = builder.system(system);
        }
        let request = builder
            .user(prompt)
            .max_tokens(params.max_tokens)
            .temperature(params.temperature)
            .build();

        debug!(provider = %resolved.kind, model = %resolved.model, "Dispatching generation");

        let response = resolved.provider.chat(&resolved.model, request).await?;

        Ok(Generation {
            provider: resolved.kind,
            model: resolved.model.clone(),
            content: response.content().to_string(),
            usage: response.usage,
        })
    }
}

#[async_trait]
impl ProviderResolver for ProviderDispatcher {
    async fn resolve(&self, name: Option<&str>) -> Result<ResolvedProvider, DomainError> {
        self.select(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::MockLlmProvider;

    fn dispatcher() -> ProviderDispatcher {
        ProviderDispatcher::new(ProviderKind::Llama)
            .with_provider(
                ProviderKind::Llama,
                Arc::new(MockLlmProvider::new("llama").with_reply("from llama")),
            )
            .with_provider(
                ProviderKind::Anthropic,
                Arc::new(MockLlmProvider::new("anthropic").with_reply("from claude")),
            )
    }

    #[tokio::test]
    async fn test_resolve_default() {
        let resolved = dispatcher().resolve(None).await.unwrap();
        assert_eq!(resolved.kind, ProviderKind::Llama);
    }

    #[tokio::test]
    async fn test_resolve_by_alias() {
        let resolved = dispatcher().resolve(Some("claude")).await.unwrap();
        assert_eq!(resolved.kind, ProviderKind::Anthropic);
    }

    #[tokio::test]
    async fn test_unknown_name_falls_back_to_default() {
        let resolved = dispatcher().resolve(Some("bard")).await.unwrap();
        assert_eq!(resolved.kind, ProviderKind::Llama);
    }

    #[tokio::test]
    async fn test_unregistered_kind_falls_back_to_default() {
        let resolved = dispatcher().resolve(Some("openai")).await.unwrap();
        assert_eq!(resolved.kind, ProviderKind::Llama);
    }

    #[tokio::test]
    async fn test_missing_default_is_configuration_error() {
        let dispatcher = ProviderDispatcher::new(ProviderKind::OpenAi);
        let err = dispatcher.resolve(None).await.unwrap_err();
        assert!(matches!(err, DomainError::Configuration { .. }));
    }

    #[tokio::test]
    async fn test_generate() {
        let generation = dispatcher()
            .generate(Some("anthropic"), "Hello", GenerationParams::default())
            .await
            .unwrap();

        assert_eq!(generation.provider, ProviderKind::Anthropic);
        assert_eq!(generation.model, "mock-model");
        assert_eq!(generation.content, "from claude");
    }

    #[tokio::test]
    async fn test_generate_builds_request() {
        let provider = Arc::new(MockLlmProvider::new("llama").with_reply("ok"));
        let dispatcher =
            ProviderDispatcher::new(ProviderKind::Llama).with_provider(ProviderKind::Llama, provider.clone());

        dispatcher
            .generate(
                None,
                "Write",
                GenerationParams::default()
                    .with_system("You are terse")
                    .with_max_tokens(150)
                    .with_temperature(0.1),
            )
            .await
            .unwrap();

        let (_, request) = provider.last_request().unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.max_tokens, Some(150));
        assert_eq!(request.temperature, Some(0.1));
    }

    #[test]
    fn test_select_target_applies_model_only_when_served() {
        let dispatcher = dispatcher();

        let resolved = dispatcher
            .select_target(Some("anthropic"), Some("claude-3-haiku"))
            .unwrap();
        assert_eq!(resolved.model, "claude-3-haiku");

        let resolved = dispatcher
            .select_target(Some("openai"), Some("gpt-3.5-turbo"))
            .unwrap();
        assert_eq!(resolved.kind, ProviderKind::Llama);
        assert_eq!(resolved.model, "mock-model");

        let resolved = dispatcher.select_target(None, Some("llama-3-8b")).unwrap();
        assert_eq!(resolved.model, "llama-3-8b");
    }

    #[test]
    fn test_registered() {
        assert_eq!(
            dispatcher().registered(),
            vec![ProviderKind::Anthropic, ProviderKind::Llama]
        );
    }
}
