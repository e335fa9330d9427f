//! Extractors and middleware shared by the routers

pub mod admin_auth;
pub mod api_key;
pub mod client;
pub mod logging;
pub mod rate_limit;
pub mod security;

pub use admin_auth::RequireAdmin;
pub use api_key::MitoApiKey;
pub use client::ClientAddress;
pub use logging::logging_middleware;
pub use rate_limit::enforce_rate_limit;
pub use security::security_headers_middleware;
