use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub providers: ProvidersConfig,
    pub generation: GenerationConfig,
    pub storage: StorageConfig,
    pub rate_limits: RateLimitsConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Take the rate limit subject from `X-Forwarded-For`. Only safe behind a
    /// proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Upstream LLM providers. A provider without credentials is not registered.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Provider used when a request names none (or an unknown one)
    pub default: String,
    pub timeout_secs: u64,
    pub openai: OpenAiSettings,
    pub anthropic: AnthropicSettings,
    pub llama: LlamaSettings,
    pub huggingface: HuggingFaceSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnthropicSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlamaSettings {
    pub api_key: Option<String>,
    /// Full chat completions URL
    pub url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HuggingFaceSettings {
    /// Optional; the free tier accepts anonymous calls
    pub api_key: Option<String>,
    pub url: String,
    /// Register the endpoint even without an API key
    pub enabled: bool,
}

/// Which provider and model a workload runs on
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GenerationTarget {
    pub provider: Option<String>,
    /// Only applied when `provider` is the one that ends up serving the call
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub content: GenerationTarget,
    pub business_models: GenerationTarget,
    pub intent: GenerationTarget,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyStoreBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStoreBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend for API keys, usage counters and rate limits
    pub keys: KeyStoreBackend,
    pub projects: ProjectStoreBackend,
    pub redis_url: Option<String>,
    pub database_url: Option<String>,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitsConfig {
    pub api_per_minute: u32,
    pub auth_per_minute: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub admin_username: String,
    /// Argon2 hash; admin login is disabled while unset
    pub admin_password_hash: Option<String>,
    pub jwt_secret: Option<String>,
    pub token_expiry_hours: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            trust_forwarded_for: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default: "llama".to_string(),
            timeout_secs: 60,
            openai: OpenAiSettings::default(),
            anthropic: AnthropicSettings::default(),
            llama: LlamaSettings::default(),
            huggingface: HuggingFaceSettings::default(),
        }
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4-turbo-preview".to_string(),
        }
    }
}

impl Default for AnthropicSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-3-opus-20240229".to_string(),
        }
    }
}

impl Default for LlamaSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3-70b-8192".to_string(),
        }
    }
}

impl Default for HuggingFaceSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            url: "https://api-inference.huggingface.co/models/meta-llama/Meta-Llama-3-8B-Instruct"
                .to_string(),
            enabled: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            content: GenerationTarget::default(),
            business_models: GenerationTarget::default(),
            intent: GenerationTarget {
                provider: Some("openai".to_string()),
                model: Some("gpt-3.5-turbo".to_string()),
            },
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            keys: KeyStoreBackend::default(),
            projects: ProjectStoreBackend::default(),
            redis_url: None,
            database_url: None,
            max_connections: 5,
        }
    }
}

impl Default for RateLimitsConfig {
    fn default() -> Self {
        Self {
            api_per_minute: 30,
            auth_per_minute: 5,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password_hash: None,
            jwt_secret: None,
            token_expiry_hours: 24,
        }
    }
}

/// Environment names predating the `APP__` scheme, mapped to config keys
const LEGACY_ENV_KEYS: &[(&str, &str)] = &[
    ("MODEL_PROVIDER", "providers.default"),
    ("OPENAI_API_KEY", "providers.openai.api_key"),
    ("CLAUDE_API_KEY", "providers.anthropic.api_key"),
    ("CLAUDE_MODEL_NAME", "providers.anthropic.model"),
    ("LLAMA_API_KEY", "providers.llama.api_key"),
    ("LLAMA_API_URL", "providers.llama.url"),
    ("LLAMA_MODEL_NAME", "providers.llama.model"),
    ("FREE_LLM_API_URL", "providers.huggingface.url"),
    ("HF_API_KEY", "providers.huggingface.api_key"),
    ("REDIS_URL", "storage.redis_url"),
    ("DATABASE_URL", "storage.database_url"),
    ("JWT_SECRET", "auth.jwt_secret"),
];

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Load with legacy variables read through `lookup`
    pub fn load_with<F>(lookup: F) -> Result<Self, config::ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            );

        for (name, key) in LEGACY_ENV_KEYS {
            let value = lookup(name).filter(|v| !v.trim().is_empty());
            builder = builder.set_override_option(*key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::load_with(|name| vars.get(name).cloned()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert!(!config.server.trust_forwarded_for);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.providers.default, "llama");
        assert_eq!(config.providers.timeout_secs, 60);
        assert_eq!(config.storage.keys, KeyStoreBackend::Memory);
        assert_eq!(config.storage.projects, ProjectStoreBackend::Memory);
        assert_eq!(config.rate_limits.api_per_minute, 30);
        assert_eq!(config.rate_limits.auth_per_minute, 5);
        assert_eq!(config.auth.token_expiry_hours, 24);
        assert_eq!(config.generation.intent.model.as_deref(), Some("gpt-3.5-turbo"));
    }

    #[test]
    fn test_legacy_environment_names() {
        let config = load(&[
            ("MODEL_PROVIDER", "claude"),
            ("CLAUDE_API_KEY", "sk-ant-test"),
            ("CLAUDE_MODEL_NAME", "claude-3-sonnet"),
            ("LLAMA_API_URL", "http://localhost:9000/v1/chat/completions"),
            ("REDIS_URL", "redis://cache:6379"),
            ("JWT_SECRET", "s3cret"),
        ]);

        assert_eq!(config.providers.default, "claude");
        assert_eq!(config.providers.anthropic.api_key.as_deref(), Some("sk-ant-test"));
        assert_eq!(config.providers.anthropic.model, "claude-3-sonnet");
        assert_eq!(
            config.providers.llama.url,
            "http://localhost:9000/v1/chat/completions"
        );
        assert_eq!(config.storage.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_blank_legacy_values_are_ignored() {
        let config = load(&[("OPENAI_API_KEY", "  ")]);
        assert!(config.providers.openai.api_key.is_none());
    }

    #[test]
    fn test_partial_sections_deserialize() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "server": {"port": 9090, "trust_forwarded_for": true},
            "storage": {"keys": "redis", "projects": "postgres"}
        }))
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9090);
        assert!(config.server.trust_forwarded_for);
        assert_eq!(config.storage.keys, KeyStoreBackend::Redis);
        assert_eq!(config.storage.projects, ProjectStoreBackend::Postgres);
        assert_eq!(config.storage.max_connections, 5);
    }
}
