//! Provider selection by name

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;

use super::LlmProvider;
use crate::domain::DomainError;

/// Supported provider families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Llama,
    HuggingFace,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Llama => "llama",
            Self::HuggingFace => "huggingface",
        }
    }

    pub fn all() -> [ProviderKind; 4] {
        [Self::OpenAi, Self::Anthropic, Self::Llama, Self::HuggingFace]
    }
}

impl FromStr for ProviderKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "llama" | "groq" => Ok(Self::Llama),
            "huggingface" | "hf" | "free" => Ok(Self::HuggingFace),
            other => Err(DomainError::validation(format!("Unknown provider: {}", other))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider together with the model to call on it
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    pub kind: ProviderKind,
    pub provider: Arc<dyn LlmProvider>,
    pub model: String,
}

/// Resolves an optional provider name to a concrete provider.
///
/// `None` selects the configured default.
#[async_trait]
pub trait ProviderResolver: Send + Sync + Debug {
    async fn resolve(&self, name: Option<&str>) -> Result<ResolvedProvider, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_aliases() {
        assert_eq!("Claude".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("free".parse::<ProviderKind>().unwrap(), ProviderKind::HuggingFace);
        assert_eq!("groq".parse::<ProviderKind>().unwrap(), ProviderKind::Llama);
        assert!("bard".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&ProviderKind::HuggingFace).unwrap(),
            "\"huggingface\""
        );
    }
}
