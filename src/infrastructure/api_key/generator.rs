//! API key generation
//!
//! Keys are `mitoai_` followed by 32 hex characters of a sha256 digest over
//! the client id, business model, timestamp, company name and 32 random bytes.
//! Only the sha256 of the full key is stored.

use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::ClientId;

pub const KEY_PREFIX: &str = "mitoai_";
const KEY_BODY_LEN: usize = 32;
const DISPLAY_PREFIX_LEN: usize = 16;
const ENTROPY_BYTES: usize = 32;

/// Result of generating a new API key
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// The full API key, shown once at creation
    pub key: String,
    /// First 16 characters, safe to display
    pub prefix: String,
    /// Lowercase hex sha256 of `key`
    pub hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct ApiKeyGenerator;

impl ApiKeyGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(
        &self,
        client_id: &ClientId,
        business_model: &str,
        company_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> GeneratedApiKey {
        let mut entropy = [0u8; ENTROPY_BYTES];
        rand::thread_rng().fill_bytes(&mut entropy);

        let mut hasher = Sha256::new();
        hasher.update(client_id.to_string().as_bytes());
        hasher.update(b"_");
        hasher.update(business_model.as_bytes());
        hasher.update(b"_");
        hasher.update(at.to_rfc3339().as_bytes());
        hasher.update(b"_");
        hasher.update(company_name.unwrap_or("individual").as_bytes());
        hasher.update(entropy);
        let digest = hex::encode(hasher.finalize());

        let key = format!("{}{}", KEY_PREFIX, &digest[..KEY_BODY_LEN]);

        GeneratedApiKey {
            prefix: display_prefix(&key).to_string(),
            hash: hash_key(&key),
            key,
        }
    }
}

/// Hash an API key for storage and lookup
pub fn hash_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

/// The displayable head of a key; never more than 16 characters
pub fn display_prefix(key: &str) -> &str {
    match key.char_indices().nth(DISPLAY_PREFIX_LEN) {
        Some((idx, _)) => &key[..idx],
        None => key,
    }
}

/// Shape check before touching storage
pub fn looks_like_key(key: &str) -> bool {
    key.strip_prefix(KEY_PREFIX).is_some_and(|body| {
        body.len() == KEY_BODY_LEN && body.chars().all(|c| c.is_ascii_hexdigit())
    })
}
