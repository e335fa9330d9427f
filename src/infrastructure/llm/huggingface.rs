use async_trait::async_trait;

use super::http_client::HttpClientTrait;
use crate::domain::{DomainError, FinishReason, LlmProvider, LlmRequest, LlmResponse, Message};

pub const DEFAULT_HUGGINGFACE_URL: &str =
    "https://api-inference.huggingface.co/models/meta-llama/Meta-Llama-3-8B-Instruct";
const MAX_NEW_TOKENS: u32 = 512;

/// Free HuggingFace inference endpoint.
///
/// The endpoint takes a single text input, so the conversation is flattened
/// and the model is fixed by the URL.
#[derive(Debug)]
pub struct HuggingFaceProvider<C: HttpClientTrait> {
    client: C,
    url: String,
    auth_header: Option<String>,
}

impl<C: HttpClientTrait> HuggingFaceProvider<C> {
    pub fn new(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            auth_header: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.auth_header = api_key
            .filter(|k| !k.is_empty())
            .map(|k| format!("Bearer {}", k));
        self
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }
}

/// `[{generated_text}]`, then `{generated_text}`, then the raw body
fn extract_generated_text(json: &serde_json::Value) -> String {
    let generated = json
        .as_array()
        .and_then(|items| items.first())
        .and_then(|first| first.get("generated_text"))
        .or_else(|| json.get("generated_text"))
        .and_then(|v| v.as_str());

    match generated {
        Some(text) => text.to_string(),
        None => json.to_string(),
    }
}

#[async_trait]
impl<C: HttpClientTrait> LlmProvider for HuggingFaceProvider<C> {
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
        let body = serde_json::json!({
            "inputs": request.prompt_text(),
            "parameters": {"max_new_tokens": MAX_NEW_TOKENS},
        });

        let json = self.client.post_json(&self.url, self.headers(), &body).await?;
        let content = extract_generated_text(&json);

        Ok(LlmResponse::new(
            String::new(),
            model.to_string(),
            Message::assistant(content),
        )
        .with_finish_reason(FinishReason::Stop))
    }

    fn provider_name(&self) -> &'static str {
        "huggingface"
    }

    fn default_model(&self) -> &str {
        self.url.rsplit("/models/").next().unwrap_or(&self.url)
    }
}
