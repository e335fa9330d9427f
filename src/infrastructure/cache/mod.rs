//! Redis connection shared by the key, usage and rate limit stores

mod redis;

pub use self::redis::RedisStore;
