//! API key record and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::access_level::{AccessLevel, PricingTier, UsageLimits};

/// Lifetime of a freshly issued key
pub const KEY_VALIDITY_DAYS: i64 = 365;

/// Identifier of the client a key was issued to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ClientId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::str::FromStr for ClientId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyStatus {
    #[default]
    Active,
    /// Temporarily disabled by an administrator
    Suspended,
    /// Permanently disabled
    Revoked,
}

impl ApiKeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Revoked => "revoked",
        }
    }
}

/// Stored metadata of an issued key. The plaintext key is never kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    id: ClientId,
    /// Lowercase hex sha256 of the full key
    key_hash: String,
    key_prefix: String,
    business_model: String,
    access_level: AccessLevel,
    #[serde(default)]
    client_data: serde_json::Value,
    status: ApiKeyStatus,
    usage_limits: UsageLimits,
    pricing: PricingTier,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ApiKeyRecord {
    pub fn new(
        id: ClientId,
        key_hash: impl Into<String>,
        key_prefix: impl Into<String>,
        business_model: impl Into<String>,
        access_level: AccessLevel,
        pricing: PricingTier,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            key_hash: key_hash.into(),
            key_prefix: key_prefix.into(),
            business_model: business_model.into(),
            access_level,
            client_data: serde_json::Value::Object(Default::default()),
            status: ApiKeyStatus::Active,
            usage_limits: access_level.usage_limits(),
            pricing,
            created_at: now,
            expires_at: now + Duration::days(KEY_VALIDITY_DAYS),
            updated_at: now,
        }
    }

    pub fn with_client_data(mut self, client_data: serde_json::Value) -> Self {
        self.client_data = client_data;
        self
    }

    pub fn with_expiration(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn id(&self) -> &ClientId {
        &self.id
    }

    pub fn key_hash(&self) -> &str {
        &self.key_hash
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn business_model(&self) -> &str {
        &self.business_model
    }

    pub fn access_level(&self) -> AccessLevel {
        self.access_level
    }

    pub fn client_data(&self) -> &serde_json::Value {
        &self.client_data
    }

    pub fn status(&self) -> ApiKeyStatus {
        self.status
    }

    pub fn usage_limits(&self) -> &UsageLimits {
        &self.usage_limits
    }

    pub fn pricing(&self) -> &PricingTier {
        &self.pricing
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Active and not past its expiry
    pub fn is_usable(&self) -> bool {
        self.status == ApiKeyStatus::Active && !self.is_expired()
    }

    /// Whether this key may call the given business model
    pub fn authorizes(&self, model: &str) -> bool {
        self.business_model == model
    }

    pub fn suspend(&mut self) {
        self.status = ApiKeyStatus::Suspended;
        self.touch();
    }

    pub fn revoke(&mut self) {
        self.status = ApiKeyStatus::Revoked;
        self.touch();
    }

    /// Reactivate a suspended key. Returns false for revoked keys.
    pub fn activate(&mut self) -> bool {
        match self.status {
            ApiKeyStatus::Revoked => false,
            ApiKeyStatus::Active => true,
            ApiKeyStatus::Suspended => {
                self.status = ApiKeyStatus::Active;
                self.touch();
                true
            }
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record() -> ApiKeyRecord {
        ApiKeyRecord::new(
            ClientId::generate(),
            "abc123",
            "mitoai_0123456789",
            "healthcare_pm",
            AccessLevel::Professional,
            PricingTier::for_category(Some("project_managers"), AccessLevel::Professional),
        )
    }

    #[test]
    fn test_new_record_defaults() {
        let record = create_test_record();

        assert_eq!(record.status(), ApiKeyStatus::Active);
        assert_eq!(record.usage_limits().monthly_limit, 10_000);
        assert_eq!(record.pricing().monthly_price, 299);
        assert_eq!(
            (record.expires_at() - record.created_at()).num_days(),
            KEY_VALIDITY_DAYS
        );
        assert!(record.client_data().is_object());
        assert!(record.is_usable());
    }

    #[test]
    fn test_expired_record_is_not_usable() {
        let record = create_test_record().with_expiration(Utc::now() - Duration::seconds(1));

        assert!(record.is_expired());
        assert!(!record.is_usable());
    }

    #[test]
    fn test_status_transitions() {
        let mut record = create_test_record();

        record.suspend();
        assert!(!record.is_usable());
        assert_eq!(record.status(), ApiKeyStatus::Suspended);

        assert!(record.activate());
        assert!(record.is_usable());

        record.revoke();
        assert!(!record.activate());
        assert_eq!(record.status(), ApiKeyStatus::Revoked);
    }

    #[test]
    fn test_authorizes_only_its_model() {
        let record = create_test_record();
        assert!(record.authorizes("healthcare_pm"));
        assert!(!record.authorizes("data_scientist"));
    }

    #[test]
    fn test_client_id_roundtrip() {
        let id = ClientId::generate();
        let parsed: ClientId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-uuid".parse::<ClientId>().is_err());
    }

    #[test]
    fn test_record_serialization() {
        let record = create_test_record();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["status"], "active");
        assert_eq!(json["access_level"], "professional");
        assert!(json.get("api_key").is_none());

        let back: ApiKeyRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back.id(), record.id());
    }
}
