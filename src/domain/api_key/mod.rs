//! API key domain
//!
//! Keys are scoped to one business model and carry an access level that
//! fixes their quotas and reported price.

mod access_level;
mod entity;
mod repository;
mod validation;

pub use access_level::{AccessLevel, PricingTier, UsageLimits, UNLIMITED};
pub use entity::{ApiKeyRecord, ApiKeyStatus, ClientId, KEY_VALIDITY_DAYS};
pub use repository::ApiKeyRepository;
pub use validation::{ApiKeyRejection, KeyValidation};

#[cfg(test)]
pub use repository::mock::MockApiKeyRepository;
