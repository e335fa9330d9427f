//! Shared Redis connection
//!
//! Thin wrapper around a `ConnectionManager` that maps every failure to
//! `DomainError::Cache`. The API key, usage and rate limit stores build their
//! own key layouts on top of it.

use std::fmt;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::DomainError;

/// Redis connection handle, cheap to clone
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    url: String,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("url", &redact_url(&self.url))
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStore {
    pub async fn connect(url: impl Into<String>) -> Result<Self, DomainError> {
        let url = url.into();
        let client = Client::open(url.as_str())
            .map_err(|e| DomainError::cache(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, url })
    }

    pub(crate) fn connection(&self) -> ConnectionManager {
        self.connection.clone()
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.connection();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| DomainError::cache(format!("Redis ping failed: {}", e)))?;
        Ok(())
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DomainError> {
        let mut conn = self.connection();
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))?;

        raw.map(|raw| {
            serde_json::from_str(&raw).map_err(|e| {
                DomainError::cache(format!("Failed to decode value at '{}': {}", key, e))
            })
        })
        .transpose()
    }

    pub async fn set_json<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let raw = serde_json::to_string(value)
            .map_err(|e| DomainError::cache(format!("Failed to encode value for '{}': {}", key, e)))?;
        self.set_ex(key, &raw, ttl).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.connection();
        conn.get(key)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to get key '{}': {}", key, e)))
    }

    pub async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.connection();
        let _: () = conn
            .set_ex(key, value, ttl.as_secs().max(1))
            .await
            .map_err(|e| DomainError::cache(format!("Failed to set key '{}': {}", key, e)))?;
        Ok(())
    }

    pub async fn delete(&self, keys: &[String]) -> Result<usize, DomainError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection();
        let deleted: usize = conn
            .del(keys)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to delete keys: {}", e)))?;
        Ok(deleted)
    }

    /// Keys matching `pattern`, walked with SCAN
    pub async fn scan_keys(&self, pattern: &str) -> Result<Vec<String>, DomainError> {
        let mut conn = self.connection();
        let mut iter = conn
            .scan_match::<_, String>(pattern)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to scan '{}': {}", pattern, e)))?;

        let mut keys = Vec::new();
        while let Some(key) = iter.next_item().await {
            keys.push(key);
        }
        Ok(keys)
    }
}

/// Hide the password part of a redis URL
fn redact_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}
