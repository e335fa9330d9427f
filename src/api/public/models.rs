//! Business model catalog and metered execution

use std::collections::BTreeMap;

use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::api::middleware::MitoApiKey;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{AccessLevel, PricingTier};
use crate::infrastructure::services::ExecuteRequest;

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub expertise_areas: Vec<String>,
    pub pricing_tiers: PricingTier,
}

#[derive(Debug, Serialize)]
pub struct AvailableModelsResponse {
    pub success: bool,
    pub available_models: BTreeMap<String, BTreeMap<String, ModelInfo>>,
    pub total_categories: usize,
    pub total_models: usize,
}

/// GET /api/models/available
pub async fn available_models(State(state): State<AppState>) -> Json<AvailableModelsResponse> {
    let catalog = state.business_models.catalog();

    let available_models: BTreeMap<_, _> = catalog
        .categories()
        .iter()
        .map(|category| {
            let models = category
                .models
                .iter()
                .map(|model| {
                    let info = ModelInfo {
                        name: model.name.clone(),
                        expertise_areas: model.expertise_areas.clone(),
                        pricing_tiers: PricingTier::for_category(
                            Some(&category.id),
                            AccessLevel::Professional,
                        ),
                    };
                    (model.id.clone(), info)
                })
                .collect();
            (category.id.clone(), models)
        })
        .collect();

    Json(AvailableModelsResponse {
        success: true,
        total_categories: available_models.len(),
        total_models: catalog.total_models(),
        available_models,
    })
}

#[derive(Debug, Deserialize)]
pub struct ExecuteModelRequest {
    #[serde(default)]
    pub model: Option<String>,
    /// Defaults to the category the model belongs to
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResultBody {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ExecuteModelResponse {
    pub success: bool,
    pub model: String,
    pub result: ExecuteResultBody,
    pub timestamp: DateTime<Utc>,
}

/// POST /api/models/execute
pub async fn execute_model(
    State(state): State<AppState>,
    MitoApiKey(api_key): MitoApiKey,
    Json(request): Json<ExecuteModelRequest>,
) -> Result<Json<ExecuteModelResponse>, ApiError> {
    let model = request
        .model
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Model specification required"))?;

    let category = request
        .category
        .or_else(|| {
            state
                .business_models
                .catalog()
                .category_of(&model)
                .map(str::to_string)
        })
        .unwrap_or_default();

    debug!(model = %model, category = %category, "Executing business model");

    let data = match request.data {
        Value::Null => Value::Object(Default::default()),
        data => data,
    };

    let result = state
        .business_models
        .execute(
            &api_key,
            ExecuteRequest {
                category,
                model,
                data,
            },
        )
        .await?;

    Ok(Json(ExecuteModelResponse {
        success: true,
        model: result.model,
        result: ExecuteResultBody {
            content: result.content,
        },
        timestamp: result.timestamp,
    }))
}
