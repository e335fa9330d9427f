//! Configuration loading

mod app_config;

pub use app_config::{
    AnthropicSettings, AppConfig, AuthConfig, GenerationConfig, GenerationTarget,
    HuggingFaceSettings, KeyStoreBackend, LlamaSettings, LogFormat, LoggingConfig,
    OpenAiSettings, ProjectStoreBackend, ProvidersConfig, RateLimitsConfig, ServerConfig,
    StorageConfig,
};
