//! Self-service API key issuance and usage

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::require_text;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{AccessLevel, PricingTier, UsageLimits, UsageSummary};
use crate::infrastructure::api_key::{display_prefix, IssueKeyRequest};

#[derive(Debug, Deserialize)]
pub struct GenerateKeyRequest {
    pub business_model: String,
    pub access_level: String,
    pub client_data: Value,
}

#[derive(Debug, Serialize)]
pub struct GenerateKeyResponse {
    pub success: bool,
    pub api_key: String,
    pub client_id: String,
    pub business_model: String,
    pub access_level: AccessLevel,
    pub usage_limits: UsageLimits,
    pub pricing: PricingTier,
    pub expires_at: DateTime<Utc>,
    pub documentation_url: String,
}

/// POST /api/keys/generate
pub async fn generate_key(
    State(state): State<AppState>,
    Json(request): Json<GenerateKeyRequest>,
) -> Result<(StatusCode, Json<GenerateKeyResponse>), ApiError> {
    require_text(&request.business_model, "business_model")?;

    let issued = state
        .api_keys
        .issue(
            IssueKeyRequest::new(
                request.business_model,
                AccessLevel::parse_lenient(&request.access_level),
            )
            .with_client_data(request.client_data),
        )
        .await?;

    let record = issued.record;
    Ok((
        StatusCode::CREATED,
        Json(GenerateKeyResponse {
            success: true,
            api_key: issued.api_key,
            client_id: record.id().to_string(),
            business_model: record.business_model().to_string(),
            access_level: record.access_level(),
            usage_limits: *record.usage_limits(),
            pricing: record.pricing().clone(),
            expires_at: record.expires_at(),
            documentation_url: issued.documentation_url,
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct KeyUsageResponse {
    pub success: bool,
    pub api_key: String,
    pub usage_statistics: UsageSummary,
}

/// GET /api/keys/{api_key}/usage
pub async fn key_usage(
    State(state): State<AppState>,
    Path(api_key): Path<String>,
) -> Result<Json<KeyUsageResponse>, ApiError> {
    let usage_statistics = state.api_keys.usage(&api_key).await?;

    Ok(Json(KeyUsageResponse {
        success: true,
        api_key: format!("{}...", display_prefix(&api_key)),
        usage_statistics,
    }))
}
