//! Administrator login

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{info, warn};

use super::jwt::{JwtClaims, JwtService, ADMIN_ROLE};
use super::password::Argon2Hasher;
use crate::config::AuthConfig;
use crate::domain::DomainError;

/// Issued on a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginToken {
    pub token: String,
    pub expires_in: i64,
}

/// Single configured administrator
#[derive(Debug, Clone)]
pub struct AdminAuthService {
    username: String,
    password_hash: Option<String>,
    hasher: Argon2Hasher,
    jwt: JwtService,
}

impl AdminAuthService {
    pub fn new(username: impl Into<String>, password_hash: Option<String>, jwt: JwtService) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.filter(|h| !h.trim().is_empty()),
            hasher: Argon2Hasher::new(),
            jwt,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        let secret = match config.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => secret.to_string(),
            None => {
                warn!("No JWT secret configured, admin tokens will not survive a restart");
                rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(48)
                    .map(char::from)
                    .collect()
            }
        };

        let service = Self::new(
            &config.admin_username,
            config.admin_password_hash.clone(),
            JwtService::new(&secret, config.token_expiry_hours),
        );

        if !service.is_enabled() {
            info!("Admin login disabled: auth.admin_password_hash is not set");
        }

        service
    }

    pub fn is_enabled(&self) -> bool {
        self.password_hash.is_some()
    }

    pub fn login(&self, username: &str, password: &str) -> Result<LoginToken, DomainError> {
        let valid = self
            .password_hash
            .as_deref()
            .is_some_and(|hash| username == self.username && self.hasher.verify(password, hash));

        if !valid {
            warn!(username, "Failed admin login");
            return Err(DomainError::unauthorized("Invalid credentials"));
        }

        info!(username, "Admin logged in");

        Ok(LoginToken {
            token: self.jwt.issue(&self.username, ADMIN_ROLE)?,
            expires_in: self.jwt.expires_in(),
        })
    }

    /// Claims of a valid admin token
    pub fn authorize(&self, token: &str) -> Result<JwtClaims, DomainError> {
        let claims = self.jwt.verify(token)?;
        if !claims.is_admin() {
            return Err(DomainError::forbidden("Admin role required"));
        }
        Ok(claims)
    }
}
