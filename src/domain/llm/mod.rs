//! LLM provider domain models and traits

mod image;
mod message;
mod provider;
mod provider_resolver;
mod request;
mod response;

pub use image::{GeneratedImage, ImageGenerator, ImageRequest, DEFAULT_IMAGE_SIZE};
pub use message::{Message, MessageRole};
pub use provider::LlmProvider;
pub use provider_resolver::{ProviderKind, ProviderResolver, ResolvedProvider};
pub use request::{LlmRequest, LlmRequestBuilder};
pub use response::{FinishReason, LlmResponse, Usage};

#[cfg(test)]
pub use image::MockImageGenerator;
#[cfg(test)]
pub use provider::mock::MockLlmProvider;
