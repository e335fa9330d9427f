//! API key repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{ApiKeyRecord, ApiKeyStatus, ClientId};
use crate::domain::DomainError;

/// Repository trait for API key records
#[async_trait]
pub trait ApiKeyRepository: Send + Sync + Debug {
    /// Store a new record; fails with a conflict if id or hash is taken
    async fn create(&self, record: ApiKeyRecord) -> Result<ApiKeyRecord, DomainError>;

    async fn get(&self, id: &ClientId) -> Result<Option<ApiKeyRecord>, DomainError>;

    /// Lookup during authentication
    async fn get_by_hash(&self, key_hash: &str) -> Result<Option<ApiKeyRecord>, DomainError>;

    async fn update(&self, record: &ApiKeyRecord) -> Result<ApiKeyRecord, DomainError>;

    async fn delete(&self, id: &ClientId) -> Result<bool, DomainError>;

    /// List all records, optionally filtered by status
    async fn list(&self, status: Option<ApiKeyStatus>) -> Result<Vec<ApiKeyRecord>, DomainError>;

    async fn count(&self, status: Option<ApiKeyStatus>) -> Result<usize, DomainError>;
}
