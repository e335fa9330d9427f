//! The AI operator: classify a request, then produce text, an image or both

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::content_service::ContentService;
use crate::config::GenerationTarget;
use crate::domain::content::{image_prompt, with_style_preference};
use crate::domain::{DomainError, IntentAnalysis};
use crate::infrastructure::llm::{GenerationParams, ProviderDispatcher};

const INTENT_MAX_TOKENS: u32 = 150;
const INTENT_TEMPERATURE: f32 = 0.1;
const DEFAULT_STYLE: &str = "professional";

/// Style note derived from request preferences.
///
/// Any non-empty preferences object yields a style, `professional` unless
/// `style` says otherwise.
pub fn style_from_preferences(preferences: Option<&Value>) -> Option<String> {
    let object = preferences?.as_object().filter(|o| !o.is_empty())?;

    Some(
        object
            .get("style")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_STYLE)
            .to_string(),
    )
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperatorOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorResult {
    pub analysis: IntentAnalysis,
    pub result: OperatorOutput,
}

#[derive(Debug, Clone)]
pub struct OperatorService {
    dispatcher: Arc<ProviderDispatcher>,
    content: ContentService,
    intent_target: GenerationTarget,
}

impl OperatorService {
    pub fn new(
        dispatcher: Arc<ProviderDispatcher>,
        content: ContentService,
        intent_target: GenerationTarget,
    ) -> Self {
        Self {
            dispatcher,
            content,
            intent_target,
        }
    }

    pub async fn analyze(&self, intent: &str) -> Result<IntentAnalysis, DomainError> {
        let resolved = self.dispatcher.select_target(
            self.intent_target.provider.as_deref(),
            self.intent_target.model.as_deref(),
        )?;

        let params = GenerationParams::default()
            .with_max_tokens(INTENT_MAX_TOKENS)
            .with_temperature(INTENT_TEMPERATURE);

        let reply = self
            .dispatcher
            .generate_with(&resolved, &IntentAnalysis::prompt(intent), params)
            .await?;

        Ok(IntentAnalysis::parse(&reply.content))
    }

    pub async fn process(
        &self,
        intent: &str,
        style: Option<&str>,
    ) -> Result<OperatorResult, DomainError> {
        let intent = intent.trim();
        if intent.is_empty() {
            return Err(DomainError::validation("No intent provided"));
        }

        let analysis = self.analyze(intent).await?;
        let mut output = OperatorOutput::default();

        if analysis.primary_action.wants_content() {
            let prompt = with_style_preference(intent, style);
            let generation = self
                .content
                .generate(&prompt, analysis.effective_content_type(), None)
                .await?;
            output.content = Some(generation.content);
        }

        if analysis.primary_action.wants_image() {
            let prompt = image_prompt(intent, output.content.is_some());
            match self.content.render_image(&prompt).await {
                Ok(image) => output.image_url = image.url,
                Err(e) => warn!(error = %e, "Image generation failed, returning without image"),
            }
        }

        info!(
            action = ?analysis.primary_action,
            content_type = %analysis.content_type,
            content = output.content.is_some(),
            image = output.image_url.is_some(),
            "Operator request processed"
        );

        Ok(OperatorResult {
            analysis,
            result: output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::PrimaryAction;
    use crate::domain::llm::{MockImageGenerator, MockLlmProvider};
    use crate::domain::{ContentType, GeneratedImage, ProviderKind};
    use serde_json::json;

    fn operator(
        provider: Arc<MockLlmProvider>,
        images: Option<MockImageGenerator>,
    ) -> OperatorService {
        let dispatcher = Arc::new(
            ProviderDispatcher::new(ProviderKind::Llama).with_provider(ProviderKind::Llama, provider),
        );
        let content = ContentService::new(
            dispatcher.clone(),
            images.map(|i| Arc::new(i) as Arc<dyn crate::domain::ImageGenerator>),
            GenerationTarget::default(),
        );
        OperatorService::new(dispatcher, content, GenerationTarget::default())
    }

    #[tokio::test]
    async fn test_content_only() {
        let provider = Arc::new(
            MockLlmProvider::new("llama")
                .with_reply(r#"{"primary_action": "content", "content_type": "article"}"#)
                .with_reply("An article"),
        );
        let service = operator(provider.clone(), None);

        let result = service.process("Write about bees", Some("casual")).await.unwrap();

        assert_eq!(result.analysis.content_type, ContentType::Article);
        assert_eq!(result.result.content.as_deref(), Some("An article"));
        assert!(result.result.image_url.is_none());

        let requests = provider.requests();
        assert_eq!(requests[0].1.max_tokens, Some(150));
        assert_eq!(requests[0].1.temperature, Some(0.1));
        assert_eq!(
            requests[1].1.messages[1].content,
            "User preferences: casual\n\nWrite about bees"
        );
    }

    #[tokio::test]
    async fn test_both_content_and_image() {
        let provider = Arc::new(
            MockLlmProvider::new("llama")
                .with_reply("```json\n{\"primary_action\": \"both\", \"content_type\": \"creative\"}\n```")
                .with_reply("A poem"),
        );
        let mut images = MockImageGenerator::new();
        images
            .expect_generate_image()
            .withf(|r| r.prompt.starts_with("Create professional illustration based on: A dragon"))
            .returning(|_| {
                Ok(GeneratedImage {
                    url: Some("https://img.example/dragon.png".to_string()),
                    revised_prompt: None,
                })
            });

        let result = operator(provider, Some(images))
            .process("A dragon", None)
            .await
            .unwrap();

        assert_eq!(result.analysis.primary_action, PrimaryAction::Both);
        assert_eq!(result.result.content.as_deref(), Some("A poem"));
        assert_eq!(
            result.result.image_url.as_deref(),
            Some("https://img.example/dragon.png")
        );
    }

    #[tokio::test]
    async fn test_image_failure_keeps_content() {
        let provider = Arc::new(
            MockLlmProvider::new("llama")
                .with_reply(r#"{"primary_action": "both", "content_type": "creative"}"#)
                .with_reply("A poem"),
        );
        let mut images = MockImageGenerator::new();
        images
            .expect_generate_image()
            .times(1)
            .returning(|_| Err(DomainError::provider("openai", "dall-e down")));

        let result = operator(provider, Some(images))
            .process("A dragon", None)
            .await
            .unwrap();

        assert_eq!(result.analysis.primary_action, PrimaryAction::Both);
        assert_eq!(result.result.content.as_deref(), Some("A poem"));
        assert!(result.result.image_url.is_none());
    }

    #[tokio::test]
    async fn test_image_without_backend_is_not_fatal() {
        let provider = Arc::new(
            MockLlmProvider::new("llama")
                .with_reply(r#"{"primary_action": "image", "content_type": "creative"}"#),
        );

        let result = operator(provider, None).process("A lighthouse", None).await.unwrap();

        assert_eq!(result.analysis.primary_action, PrimaryAction::Image);
        assert_eq!(result.result, OperatorOutput::default());
    }

    #[tokio::test]
    async fn test_malformed_analysis_falls_back_to_story() {
        let provider = Arc::new(
            MockLlmProvider::new("llama")
                .with_reply("I think you want a story")
                .with_reply("Once upon a time"),
        );
        let service = operator(provider.clone(), None);

        let result = service.process("Something", None).await.unwrap();
        assert_eq!(result.analysis, IntentAnalysis::default());

        let (_, request) = provider.last_request().unwrap();
        assert_eq!(request.messages[0].content, ContentType::Story.system_prompt());
    }

    #[tokio::test]
    async fn test_analysis_answered_as_business_content() {
        let provider = Arc::new(
            MockLlmProvider::new("llama")
                .with_reply(r#"{"primary_action": "analysis", "content_type": "story"}"#)
                .with_reply("SWOT"),
        );
        let service = operator(provider.clone(), None);

        service.process("Analyze my market", None).await.unwrap();

        let (_, request) = provider.last_request().unwrap();
        assert_eq!(request.messages[0].content, ContentType::Business.system_prompt());
    }

    #[tokio::test]
    async fn test_empty_intent() {
        let service = operator(Arc::new(MockLlmProvider::new("llama")), None);
        let err = service.process("   ", None).await.unwrap_err();
        assert_eq!(err.message(), "No intent provided");
    }

    #[test]
    fn test_style_from_preferences() {
        assert_eq!(style_from_preferences(None), None);
        assert_eq!(style_from_preferences(Some(&json!({}))), None);
        assert_eq!(
            style_from_preferences(Some(&json!({"tone": "warm"}))).as_deref(),
            Some("professional")
        );
        assert_eq!(
            style_from_preferences(Some(&json!({"style": "noir"}))).as_deref(),
            Some("noir")
        );
    }
}
