//! Platform status and provider listing

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::state::{AppState, PLATFORM_NAME};
use crate::api::types::{ApiError, Json};
use crate::domain::{ApiKeyStatus, ProviderKind};

#[derive(Debug, Serialize)]
pub struct ApiHealthResponse {
    pub status: &'static str,
    pub platform: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/health
pub async fn health() -> Json<ApiHealthResponse> {
    Json(ApiHealthResponse {
        status: "healthy",
        platform: PLATFORM_NAME,
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub pong: bool,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/ping
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        pong: true,
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Serialize)]
pub struct PlatformStatusResponse {
    pub status: &'static str,
    pub platform: &'static str,
    pub version: &'static str,
    pub active_api_keys: usize,
    pub available_models: usize,
    pub model_categories: usize,
    pub providers: Vec<ProviderKind>,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/platform/status
pub async fn status(State(state): State<AppState>) -> Result<Json<PlatformStatusResponse>, ApiError> {
    let catalog = state.business_models.catalog();
    let active_api_keys = state.api_keys.count(Some(ApiKeyStatus::Active)).await?;

    Ok(Json(PlatformStatusResponse {
        status: "operational",
        platform: PLATFORM_NAME,
        version: env!("CARGO_PKG_VERSION"),
        active_api_keys,
        available_models: catalog.total_models(),
        model_categories: catalog.categories().len(),
        providers: state.dispatcher.registered(),
        timestamp: Utc::now(),
    }))
}

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub success: bool,
    pub providers: Vec<ProviderKind>,
    pub default_provider: ProviderKind,
    pub image_generation: bool,
}

/// GET /api/providers
pub async fn providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        success: true,
        providers: state.dispatcher.registered(),
        default_provider: state.dispatcher.default_kind(),
        image_generation: state.content.images_enabled(),
    })
}
