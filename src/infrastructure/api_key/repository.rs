//! In-memory API key repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::api_key::{ApiKeyRecord, ApiKeyRepository, ApiKeyStatus, ClientId};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<ClientId, ApiKeyRecord>,
    hash_index: HashMap<String, ClientId>,
}

/// In-memory implementation of ApiKeyRepository
#[derive(Debug, Default, Clone)]
pub struct InMemoryApiKeyRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryApiKeyRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApiKeyRepository for InMemoryApiKeyRepository {
    async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        let mut inner = self.inner.write().await;

        if inner.records.contains_key(record.id()) {
            return Err(DomainError::conflict(format!(
                "API key for client '{}' already exists",
                record.id()
            )));
        }
        if inner.hash_index.contains_key(record.key_hash()) {
            return Err(DomainError::conflict("API key hash already exists"));
        }

        inner
            .hash_index
            .insert(record.key_hash().to_string(), record.id().clone());
        inner.records.insert(record.id().clone(), record.clone());

        Ok(record)
    }

    async fn get(&self, id: &ClientId) -> Result<Option<ApiKeyRecord>, DomainError> {
        Ok(self.inner.read().await.records.get(id).cloned())
    }

    async fn get_by_hash(&self, key_hash: &str) -> Result<Option<ApiKeyRecord>, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .hash_index
            .get(key_hash)
            .and_then(|id| inner.records.get(id))
            .cloned())
    }

    async fn update(&self, record: &ApiKeyRecord) -> Result<ApiKeyRecord, DomainError> {
        let mut inner = self.inner.write().await;

        match inner.records.get_mut(record.id()) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record.clone())
            }
            None => Err(DomainError::not_found(format!(
                "API key for client '{}' not found",
                record.id()
            ))),
        }
    }

    async fn delete(&self, id: &ClientId) -> Result<bool, DomainError> {
        let mut inner = self.inner.write().await;

        match inner.records.remove(id) {
            Some(record) => {
                inner.hash_index.remove(record.key_hash());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, status: Option<ApiKeyStatus>) -> Result<Vec<ApiKeyRecord>, DomainError> {
        let inner = self.inner.read().await;
        let mut records: Vec<ApiKeyRecord> = inner
            .records
            .values()
            .filter(|r| status.is_none_or(|s| r.status() == s))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at());
        Ok(records)
    }

    async fn count(&self, status: Option<ApiKeyStatus>) -> Result<usize, DomainError> {
        let inner = self.inner.read().await;
        Ok(inner
            .records
            .values()
            .filter(|r| status.is_none_or(|s| r.status() == s))
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::{AccessLevel, PricingTier};

    fn record(hash: &str) -> ApiKeyRecord {
        ApiKeyRecord::new(
            ClientId::generate(),
            hash,
            "mitoai_0123456789",
            "software_pm",
            AccessLevel::Professional,
            PricingTier::for_category(Some("project_managers"), AccessLevel::Professional),
        )
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = InMemoryApiKeyRepository::new();
        let created = repo.create(record("h1")).await.unwrap();

        let by_id = repo.get(created.id()).await.unwrap().unwrap();
        assert_eq!(by_id.key_hash(), "h1");

        let by_hash = repo.get_by_hash("h1").await.unwrap().unwrap();
        assert_eq!(by_hash.id(), created.id());
    }

    #[tokio::test]
    async fn test_duplicate_hash_is_conflict() {
        let repo = InMemoryApiKeyRepository::new();
        repo.create(record("same")).await.unwrap();

        let err = repo.create(record("same")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let repo = InMemoryApiKeyRepository::new();
        let err = repo.update(&record("h1")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_drops_hash_index() {
        let repo = InMemoryApiKeyRepository::new();
        let created = repo.create(record("h1")).await.unwrap();

        assert!(repo.delete(created.id()).await.unwrap());
        assert!(repo.get_by_hash("h1").await.unwrap().is_none());
        assert!(!repo.delete(created.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_and_count_by_status() {
        let repo = InMemoryApiKeyRepository::new();
        let mut first = repo.create(record("h1")).await.unwrap();
        repo.create(record("h2")).await.unwrap();

        first.revoke();
        repo.update(&first).await.unwrap();

        assert_eq!(repo.list(None).await.unwrap().len(), 2);
        assert_eq!(repo.count(Some(ApiKeyStatus::Revoked)).await.unwrap(), 1);
        assert_eq!(repo.count(Some(ApiKeyStatus::Active)).await.unwrap(), 1);
    }
}
