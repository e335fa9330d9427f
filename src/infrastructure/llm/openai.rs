use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http_client::HttpClientTrait;
use crate::domain::{
    DomainError, FinishReason, GeneratedImage, ImageGenerator, ImageRequest, LlmProvider,
    LlmRequest, LlmResponse, Message, Usage,
};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_LLAMA_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_LLAMA_MODEL: &str = "llama-3-70b-8192";
const IMAGE_MODEL: &str = "dall-e-3";

/// OpenAI chat completions provider.
///
/// Also serves OpenAI-compatible endpoints (the Llama provider) through
/// [`OpenAiProvider::with_endpoint`], and DALL-E through [`ImageGenerator`].
#[derive(Debug)]
pub struct OpenAiProvider<C: HttpClientTrait> {
    client: C,
    name: &'static str,
    auth_header: String,
    base_url: String,
    chat_url: Option<String>,
    default_model: String,
}

impl<C: HttpClientTrait> OpenAiProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            name: "openai",
            auth_header: format!("Bearer {}", api_key.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            chat_url: None,
            default_model: DEFAULT_OPENAI_MODEL.to_string(),
        }
    }

    /// OpenAI-compatible Llama endpoint, addressed by its full chat URL
    pub fn llama(client: C, api_key: impl Into<String>, chat_url: impl Into<String>) -> Self {
        Self::new(client, api_key)
            .with_endpoint(chat_url)
            .with_name("llama")
            .with_default_model(DEFAULT_LLAMA_MODEL)
    }

    pub fn with_endpoint(mut self, chat_url: impl Into<String>) -> Self {
        self.chat_url = Some(chat_url.into());
        self
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn chat_completions_url(&self) -> String {
        self.chat_url
            .clone()
            .unwrap_or_else(|| format!("{}/v1/chat/completions", self.base_url))
    }

    fn images_url(&self) -> String {
        format!("{}/v1/images/generations", self.base_url)
    }

    fn build_request(&self, model: &str, request: &LlmRequest) -> serde_json::Value {
        let messages: Vec<OpenAiMessage> =
            request.messages.iter().map(OpenAiMessage::from_domain).collect();

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if let Some(top_p) = request.top_p {
            body["top_p"] = serde_json::json!(top_p);
        }

        if let Some(ref stop) = request.stop {
            body["stop"] = serde_json::json!(stop);
        }

        body
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn parse_response(
        &self,
        model: &str,
        json: serde_json::Value,
    ) -> Result<LlmResponse, DomainError> {
        let response: OpenAiResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(self.name, format!("Failed to parse response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider(self.name, "No choices in response"))?;

        let message = Message::assistant(choice.message.content.unwrap_or_default());
        let model = response.model.unwrap_or_else(|| model.to_string());

        let mut llm_response = LlmResponse::new(response.id.unwrap_or_default(), model, message);

        if let Some(reason) = choice.finish_reason {
            llm_response = llm_response.with_finish_reason(FinishReason::from_provider(&reason));
        }

        if let Some(usage) = response.usage {
            llm_response = llm_response
                .with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for OpenAiProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let url = self.chat_completions_url();
        let body = self.build_request(model, &request);
        let response = self.client.post_json(&url, self.headers(), &body).await?;

        self.parse_response(model, response)
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

#[async_trait]
impl<C: HttpClientTrait> ImageGenerator for OpenAiProvider<C> {
    async fn generate_image(&self, request: ImageRequest) -> Result<GeneratedImage, DomainError> {
        let body = serde_json::json!({
            "model": IMAGE_MODEL,
            "prompt": request.prompt,
            "n": request.n,
            "size": request.size,
        });

        let json = self
            .client
            .post_json(&self.images_url(), self.headers(), &body)
            .await?;

        let response: ImageResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(self.name, format!("Failed to parse image response: {}", e))
        })?;

        response
            .data
            .into_iter()
            .next()
            .map(|image| GeneratedImage {
                url: image.url,
                revised_prompt: image.revised_prompt,
            })
            .ok_or_else(|| DomainError::provider(self.name, "No images in response"))
    }
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

impl OpenAiMessage {
    fn from_domain(message: &Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: message.content_text().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    url: Option<String>,
    revised_prompt: Option<String>,
}
