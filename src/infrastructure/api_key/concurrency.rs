//! Per-client limit on in-flight requests

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, RwLock, Semaphore};

use crate::domain::{ApiKeyRejection, ClientId};

/// Held for the duration of a provider call
#[derive(Debug)]
pub struct ConcurrencyPermit {
    _permit: OwnedSemaphorePermit,
}

/// One semaphore per client, sized by the key's `concurrent_requests`.
/// Counts only requests handled by this process.
#[derive(Debug, Default)]
pub struct ConcurrencyLimiter {
    semaphores: RwLock<HashMap<ClientId, (u32, Arc<Semaphore>)>>,
}

impl ConcurrencyLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    async fn semaphore(&self, client_id: &ClientId, capacity: u32) -> Arc<Semaphore> {
        if let Some((size, semaphore)) = self.semaphores.read().await.get(client_id) {
            if *size == capacity {
                return semaphore.clone();
            }
        }

        let mut semaphores = self.semaphores.write().await;
        let entry = semaphores
            .entry(client_id.clone())
            .or_insert_with(|| (capacity, Arc::new(Semaphore::new(capacity as usize))));

        // Access level changed; in-flight permits drain from the old semaphore
        if entry.0 != capacity {
            *entry = (capacity, Arc::new(Semaphore::new(capacity as usize)));
        }

        entry.1.clone()
    }

    pub async fn try_acquire(
        &self,
        client_id: &ClientId,
        capacity: u32,
    ) -> Result<ConcurrencyPermit, ApiKeyRejection> {
        self.semaphore(client_id, capacity)
            .await
            .try_acquire_owned()
            .map(|permit| ConcurrencyPermit { _permit: permit })
            .map_err(|_| ApiKeyRejection::ConcurrencyLimitExceeded)
    }

    /// Drop the semaphore of a deleted client
    pub async fn forget(&self, client_id: &ClientId) {
        self.semaphores.write().await.remove(client_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limits_in_flight_requests() {
        let limiter = ConcurrencyLimiter::new();
        let client = ClientId::generate();

        let first = limiter.try_acquire(&client, 2).await.unwrap();
        let _second = limiter.try_acquire(&client, 2).await.unwrap();

        assert_eq!(
            limiter.try_acquire(&client, 2).await.unwrap_err(),
            ApiKeyRejection::ConcurrencyLimitExceeded
        );

        drop(first);
        assert!(limiter.try_acquire(&client, 2).await.is_ok());
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = ConcurrencyLimiter::new();
        let _held = limiter.try_acquire(&ClientId::generate(), 1).await.unwrap();

        assert!(limiter.try_acquire(&ClientId::generate(), 1).await.is_ok());
    }

    #[tokio::test]
    async fn test_capacity_change_replaces_semaphore() {
        let limiter = ConcurrencyLimiter::new();
        let client = ClientId::generate();

        let _held = limiter.try_acquire(&client, 1).await.unwrap();
        assert!(limiter.try_acquire(&client, 1).await.is_err());
        assert!(limiter.try_acquire(&client, 5).await.is_ok());
    }
}
