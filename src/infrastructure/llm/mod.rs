//! LLM provider implementations

mod anthropic;
mod dispatcher;
mod factory;
mod http_client;
mod huggingface;
mod openai;

pub use anthropic::{AnthropicProvider, DEFAULT_ANTHROPIC_MODEL};
pub use dispatcher::{Generation, GenerationParams, ProviderDispatcher};
pub use factory::{LlmProviderFactory, ProviderSet};
pub use http_client::{HttpClient, HttpClientTrait};
pub use huggingface::{HuggingFaceProvider, DEFAULT_HUGGINGFACE_URL};
pub use openai::{OpenAiProvider, DEFAULT_LLAMA_MODEL, DEFAULT_LLAMA_URL, DEFAULT_OPENAI_MODEL};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
