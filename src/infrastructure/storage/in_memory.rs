//! In-memory storage

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::storage::{Storage, StorageEntity, StorageKey};
use crate::domain::DomainError;

/// Entities held in process memory, lost on restart
#[derive(Debug)]
pub struct InMemoryStorage<E>
where
    E: StorageEntity,
{
    entities: Arc<RwLock<HashMap<String, E>>>,
}

impl<E: StorageEntity> Default for InMemoryStorage<E> {
    fn default() -> Self {
        Self {
            entities: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<E: StorageEntity> InMemoryStorage<E> {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<E> Storage<E> for InMemoryStorage<E>
where
    E: StorageEntity + 'static,
{
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError> {
        Ok(self.entities.read().await.get(key.as_str()).cloned())
    }

    async fn list(&self) -> Result<Vec<E>, DomainError> {
        Ok(self.entities.read().await.values().cloned().collect())
    }

    async fn create(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.entities.write().await;

        if entities.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Entity with key '{}' already exists",
                key
            )));
        }

        entities.insert(key, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: E) -> Result<E, DomainError> {
        let key = entity.key().as_str().to_string();
        let mut entities = self.entities.write().await;

        match entities.get_mut(&key) {
            Some(existing) => {
                *existing = entity.clone();
                Ok(entity)
            }
            None => Err(DomainError::not_found(format!(
                "Entity with key '{}' not found",
                key
            ))),
        }
    }

    async fn delete(&self, key: &E::Key) -> Result<bool, DomainError> {
        Ok(self.entities.write().await.remove(key.as_str()).is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.entities.read().await.len())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.entities.write().await.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::project::{Industry, Project};

    #[tokio::test]
    async fn test_crud() {
        let storage = InMemoryStorage::<Project>::new();
        let project = Project::new(Industry::Software, "Gateway");
        let id = project.id.clone();

        storage.create(project.clone()).await.unwrap();
        assert!(storage.exists(&id).await.unwrap());
        assert_eq!(storage.count().await.unwrap(), 1);

        let mut renamed = project.clone();
        renamed.name = "Gateway v2".to_string();
        storage.update(renamed).await.unwrap();
        assert_eq!(storage.get(&id).await.unwrap().unwrap().name, "Gateway v2");

        assert!(storage.delete(&id).await.unwrap());
        assert!(storage.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_conflict_and_update_missing() {
        let storage = InMemoryStorage::<Project>::new();
        let project = Project::new(Industry::Media, "Podcast");

        storage.create(project.clone()).await.unwrap();
        assert!(matches!(
            storage.create(project.clone()).await.unwrap_err(),
            DomainError::Conflict { .. }
        ));

        let other = Project::new(Industry::Finance, "Ledger");
        assert!(matches!(
            storage.update(other).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_save_and_clear() {
        let storage = InMemoryStorage::<Project>::new();
        let project = Project::new(Industry::Healthcare, "Clinic");

        storage.save(project.clone()).await.unwrap();
        storage.save(project).await.unwrap();
        assert_eq!(storage.list().await.unwrap().len(), 1);

        storage.clear().await.unwrap();
        assert_eq!(storage.count().await.unwrap(), 0);
    }
}
