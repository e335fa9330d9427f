//! Redis-backed API key repository
//!
//! Layout:
//! - `apikey:{hash}` the record as JSON, expiring at the record's `expires_at`
//! - `apikey:id:{client_id}` the key hash, same TTL
//! - `apikeys` set of every client id

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use tracing::debug;

use crate::domain::api_key::{ApiKeyRecord, ApiKeyRepository, ApiKeyStatus, ClientId};
use crate::domain::DomainError;
use crate::infrastructure::cache::RedisStore;

const INDEX_SET: &str = "apikeys";

/// Time left until `expires_at`, at least one second
fn record_ttl(record: &ApiKeyRecord, now: DateTime<Utc>) -> Duration {
    let secs = (record.expires_at() - now).num_seconds().max(1);
    Duration::from_secs(secs as u64)
}

fn record_key(hash: &str) -> String {
    format!("apikey:{}", hash)
}

fn id_key(id: &ClientId) -> String {
    format!("apikey:id:{}", id)
}

#[derive(Debug, Clone)]
pub struct RedisApiKeyRepository {
    store: RedisStore,
}

impl RedisApiKeyRepository {
    pub fn new(store: RedisStore) -> Self {
        Self { store }
    }

    async fn write(&self, record: &ApiKeyRecord) -> Result<(), DomainError> {
        let ttl = record_ttl(record, Utc::now());
        self.store
            .set_json(&record_key(record.key_hash()), record, ttl)
            .await?;
        self.store
            .set_ex(&id_key(record.id()), record.key_hash(), ttl)
            .await
    }

    async fn members(&self) -> Result<Vec<ClientId>, DomainError> {
        let mut conn = self.store.connection();
        let ids: Vec<String> = conn
            .smembers(INDEX_SET)
            .await
            .map_err(|e| DomainError::cache(format!("Failed to read key index: {}", e)))?;

        Ok(ids.iter().filter_map(|id| id.parse().ok()).collect())
    }

    async fn forget(&self, id: &ClientId) -> Result<(), DomainError> {
        let mut conn = self.store.connection();
        let _: usize = conn
            .srem(INDEX_SET, id.to_string())
            .await
            .map_err(|e| DomainError::cache(format!("Failed to update key index: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ApiKeyRepository for RedisApiKeyRepository {
    async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        if self.store.get(&id_key(record.id())).await?.is_some() {
            return Err(DomainError::conflict(format!(
                "API key for client '{}' already exists",
                record.id()
            )));
        }
        if self.store.get(&record_key(record.key_hash())).await?.is_some() {
            return Err(DomainError::conflict("API key hash already exists"));
        }

        self.write(&record).await?;

        let mut conn = self.store.connection();
        let _: usize = conn
            .sadd(INDEX_SET, record.id().to_string())
            .await
            .map_err(|e| DomainError::cache(format!("Failed to update key index: {}", e)))?;

        debug!(client_id = %record.id(), "Stored API key record");
        Ok(record)
    }

    async fn get(&self, id: &ClientId) -> Result<Option<ApiKeyRecord>, DomainError> {
        match self.store.get(&id_key(id)).await? {
            Some(hash) => self.get_by_hash(&hash).await,
            None => Ok(None),
        }
    }

    async fn get_by_hash(&self, key_hash: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        self.store.get_json(&record_key(key_hash)).await
    }

    async fn update(&self, record: &ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        if self.get(record.id()).await?.is_none() {
            return Err(DomainError::not_found(format!(
                "API key for client '{}' not found",
                record.id()
            )));
        }

        self.write(record).await?;
        Ok(record.clone())
    }

    async fn delete(&self, id: &ClientId) -> Result<bool, DomainError> {
        let Some(hash) = self.store.get(&id_key(id)).await? else {
            self.forget(id).await?;
            return Ok(false);
        };

        self.store.delete(&[record_key(&hash), id_key(id)]).await?;
        self.forget(id).await?;
        Ok(true)
    }

    async fn list(&self, status: Option<ApiKeyStatus>) -> Result<Vec<ApiKeyRecord>, DomainError> {
        let mut records = Vec::new();

        for id in self.members().await? {
            match self.get(&id).await? {
                Some(record) if status.is_none_or(|s| record.status() == s) => {
                    records.push(record)
                }
                Some(_) => {}
                // Expired out of Redis
                None => self.forget(&id).await?,
            }
        }

        records.sort_by_key(|r| r.created_at());
        Ok(records)
    }

    async fn count(&self, status: Option<ApiKeyStatus>) -> Result<usize, DomainError> {
        Ok(self.list(status).await?.len())
    }
}
