//! Administrator authentication

mod admin;
mod jwt;
mod password;

pub use admin::{AdminAuthService, LoginToken};
pub use jwt::{JwtClaims, JwtService, ADMIN_ROLE};
pub use password::Argon2Hasher;
