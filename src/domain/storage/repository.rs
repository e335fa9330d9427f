use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::StorageEntity;
use crate::domain::DomainError;

/// CRUD over one entity type
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    async fn list(&self) -> Result<Vec<E>, DomainError>;

    /// Fails with a conflict if the key is taken
    async fn create(&self, entity: E) -> Result<E, DomainError>;

    /// Fails with not found if the key is absent
    async fn update(&self, entity: E) -> Result<E, DomainError>;

    /// Create or update
    async fn save(&self, entity: E) -> Result<E, DomainError> {
        if self.exists(entity.key()).await? {
            self.update(entity).await
        } else {
            self.create(entity).await
        }
    }

    /// Returns true if something was removed
    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError>;

    async fn exists(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.get(key).await?.is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.list().await?.len())
    }

    async fn clear(&self) -> Result<(), DomainError>;
}
