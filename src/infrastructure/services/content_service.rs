//! Text and image generation for end users

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::GenerationTarget;
use crate::domain::{ContentType, DomainError, GeneratedImage, ImageGenerator, ImageRequest};
use crate::infrastructure::llm::{Generation, GenerationParams, ProviderDispatcher};

const CONTENT_MAX_TOKENS: u32 = 2000;
const CONTENT_TEMPERATURE: f32 = 0.7;

/// Style wrapped around prompts sent straight to the image backend
pub fn illustration_prompt(prompt: &str) -> String {
    format!(
        "Professional, high-quality illustration: {}. Digital art style, detailed, vibrant colors.",
        prompt
    )
}

#[derive(Debug, Clone)]
pub struct ContentService {
    dispatcher: Arc<ProviderDispatcher>,
    images: Option<Arc<dyn ImageGenerator>>,
    target: GenerationTarget,
}

impl ContentService {
    pub fn new(
        dispatcher: Arc<ProviderDispatcher>,
        images: Option<Arc<dyn ImageGenerator>>,
        target: GenerationTarget,
    ) -> Self {
        Self {
            dispatcher,
            images,
            target,
        }
    }

    pub fn images_enabled(&self) -> bool {
        self.images.is_some()
    }

    /// Generate text with the system prompt of `content_type`.
    ///
    /// An explicit `provider` wins over the configured content target.
    pub async fn generate(
        &self,
        prompt: &str,
        content_type: ContentType,
        provider: Option<&str>,
    ) -> Result<Generation, DomainError> {
        let resolved = match provider {
            Some(provider) => self.dispatcher.select(Some(provider))?,
            None => self
                .dispatcher
                .select_target(self.target.provider.as_deref(), self.target.model.as_deref())?,
        };

        let params = GenerationParams::default()
            .with_system(content_type.system_prompt())
            .with_max_tokens(CONTENT_MAX_TOKENS)
            .with_temperature(CONTENT_TEMPERATURE);

        let generation = self.dispatcher.generate_with(&resolved, prompt, params).await?;

        info!(
            provider = %generation.provider,
            content_type = %content_type,
            "Content generated"
        );
        Ok(generation)
    }

    /// Illustrate a user prompt in the house style
    pub async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage, DomainError> {
        self.render_image(&illustration_prompt(prompt)).await
    }

    /// Send a prompt to the image backend unchanged
    pub async fn render_image(&self, prompt: &str) -> Result<GeneratedImage, DomainError> {
        let images = self
            .images
            .as_ref()
            .ok_or_else(|| DomainError::configuration("Image generation is not configured"))?;

        debug!("Requesting image");
        images.generate_image(ImageRequest::new(prompt)).await
    }
}
