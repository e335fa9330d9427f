//! Usage accounting: quota reservation and request statistics

mod in_memory;
mod redis_repository;
mod service;

pub use in_memory::InMemoryUsageRepository;
pub use redis_repository::RedisUsageRepository;
pub use service::UsageTrackingService;
