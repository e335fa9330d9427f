//! Business model API key header

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::api::types::ApiError;

pub const API_KEY_HEADER: &str = "x-mitoai-api-key";

/// The raw `X-MitoAI-API-Key` value. Validation happens per request against
/// the model being executed, so this extractor only checks presence.
#[derive(Debug, Clone)]
pub struct MitoApiKey(pub String);

impl<S> FromRequestParts<S> for MitoApiKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| MitoApiKey(v.to_string()))
            .ok_or_else(|| ApiError::unauthorized("API key required in X-MitoAI-API-Key header"))
    }
}
