//! API key management admin endpoints

use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{AccessLevel, ApiKeyRecord, ApiKeyStatus, ClientId, PricingTier, UsageLimits};

/// Key record as shown to administrators. Only the display prefix of the key
/// is ever exposed.
#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyResponse {
    pub client_id: String,
    pub key_prefix: String,
    pub business_model: String,
    pub access_level: AccessLevel,
    pub status: ApiKeyStatus,
    pub usage_limits: UsageLimits,
    pub pricing: PricingTier,
    pub client_data: Value,
    pub created_at: String,
    pub updated_at: String,
    pub expires_at: String,
    pub expired: bool,
}

impl From<&ApiKeyRecord> for ApiKeyResponse {
    fn from(record: &ApiKeyRecord) -> Self {
        Self {
            client_id: record.id().to_string(),
            key_prefix: format!("{}...", record.key_prefix()),
            business_model: record.business_model().to_string(),
            access_level: record.access_level(),
            status: record.status(),
            usage_limits: *record.usage_limits(),
            pricing: record.pricing().clone(),
            client_data: record.client_data().clone(),
            created_at: record.created_at().to_rfc3339(),
            updated_at: record.updated_at().to_rfc3339(),
            expires_at: record.expires_at().to_rfc3339(),
            expired: record.is_expired(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListApiKeysQuery {
    #[serde(default)]
    pub status: Option<ApiKeyStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListApiKeysResponse {
    pub api_keys: Vec<ApiKeyResponse>,
    pub total: usize,
}

fn parse_client_id(raw: &str) -> Result<ClientId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid client id: {}", raw)))
}

/// GET /admin/api-keys
pub async fn list_api_keys(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Query(query): Query<ListApiKeysQuery>,
) -> Result<Json<ListApiKeysResponse>, ApiError> {
    debug!(status = ?query.status, "Admin listing API keys");

    let records = state.api_keys.list(query.status).await?;
    let api_keys: Vec<ApiKeyResponse> = records.iter().map(ApiKeyResponse::from).collect();

    Ok(Json(ListApiKeysResponse {
        total: api_keys.len(),
        api_keys,
    }))
}

/// GET /admin/api-keys/{client_id}
pub async fn get_api_key(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(client_id): Path<String>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    let record = state.api_keys.get(&parse_client_id(&client_id)?).await?;
    Ok(Json(ApiKeyResponse::from(&record)))
}

/// DELETE /admin/api-keys/{client_id}
pub async fn delete_api_key(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(client_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    debug!(client_id = %client_id, admin = %claims.sub, "Admin deleting API key");

    let id = parse_client_id(&client_id)?;
    state.api_keys.delete(&id).await?;
    state.business_models.forget_client(&id).await;

    Ok(Json(serde_json::json!({
        "deleted": true,
        "client_id": client_id
    })))
}

/// POST /admin/api-keys/{client_id}/suspend
pub async fn suspend_api_key(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(client_id): Path<String>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    debug!(client_id = %client_id, admin = %claims.sub, "Admin suspending API key");

    let record = state.api_keys.suspend(&parse_client_id(&client_id)?).await?;
    Ok(Json(ApiKeyResponse::from(&record)))
}

/// POST /admin/api-keys/{client_id}/activate
pub async fn activate_api_key(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(client_id): Path<String>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    debug!(client_id = %client_id, admin = %claims.sub, "Admin activating API key");

    let record = state.api_keys.activate(&parse_client_id(&client_id)?).await?;
    Ok(Json(ApiKeyResponse::from(&record)))
}

/// POST /admin/api-keys/{client_id}/revoke
pub async fn revoke_api_key(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(client_id): Path<String>,
) -> Result<Json<ApiKeyResponse>, ApiError> {
    debug!(client_id = %client_id, admin = %claims.sub, "Admin revoking API key");

    let record = state.api_keys.revoke(&parse_client_id(&client_id)?).await?;
    Ok(Json(ApiKeyResponse::from(&record)))
}
