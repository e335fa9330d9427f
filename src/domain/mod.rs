//! Domain layer - Core business logic and entities

pub mod api_key;
pub mod catalog;
pub mod content;
pub mod error;
pub mod llm;
pub mod project;
pub mod storage;
pub mod usage;

pub use api_key::{
    AccessLevel, ApiKeyRecord, ApiKeyRejection, ApiKeyRepository, ApiKeyStatus, ClientId,
    KeyValidation, PricingTier, UsageLimits,
};
pub use catalog::{Catalog, CatalogModel};
pub use content::{ContentType, IntentAnalysis, PrimaryAction};
pub use error::DomainError;
pub use llm::{
    FinishReason, GeneratedImage, ImageGenerator, ImageRequest, LlmProvider, LlmRequest,
    LlmRequestBuilder, LlmResponse, Message, MessageRole, ProviderKind, ProviderResolver,
    ResolvedProvider, Usage,
};
pub use project::{Industry, Project, ProjectId, ProjectStatus};
pub use storage::{Storage, StorageEntity, StorageKey};
pub use usage::{
    QuotaCounters, QuotaDecision, QuotaPeriods, QuotaReservation, UsageOutcome,
    UsageRepository, UsageStats, UsageSummary,
};
