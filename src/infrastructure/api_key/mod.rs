//! API key infrastructure: generation, storage, validation and request limits

mod concurrency;
mod generator;
mod rate_limiter;
mod redis_repository;
mod repository;
mod service;

pub use concurrency::{ConcurrencyLimiter, ConcurrencyPermit};
pub use generator::{display_prefix, hash_key, ApiKeyGenerator, GeneratedApiKey, KEY_PREFIX};
pub use rate_limiter::{
    RateLimitResult, RateLimiter, RatePolicy, RedisRateLimiter, SlidingWindowRateLimiter,
};
pub use redis_repository::RedisApiKeyRepository;
pub use repository::InMemoryApiKeyRepository;
pub use service::{ApiKeyService, IssueKeyRequest, IssuedKey};
