//! Text, image and operator endpoints

use axum::extract::State;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::require_text;
use crate::api::middleware::{enforce_rate_limit, ClientAddress};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{ContentType, IntentAnalysis, ProviderKind};
use crate::infrastructure::api_key::RatePolicy;
use crate::infrastructure::llm::GenerationParams;
use crate::infrastructure::services::{style_from_preferences, OperatorOutput};

#[derive(Debug, Deserialize)]
pub struct AiGenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AiGenerateResponse {
    pub success: bool,
    pub provider: ProviderKind,
    pub model: String,
    pub content: String,
}

/// POST /api/ai/generate
pub async fn ai_generate(
    State(state): State<AppState>,
    client: ClientAddress,
    Json(request): Json<AiGenerateRequest>,
) -> Result<Json<AiGenerateResponse>, ApiError> {
    enforce_rate_limit(&state, &client, &RatePolicy::api(&state.rate_limits)).await?;
    require_text(&request.prompt, "prompt")?;

    let generation = state
        .dispatcher
        .generate(
            request.provider.as_deref(),
            &request.prompt,
            GenerationParams::default(),
        )
        .await?;

    Ok(Json(AiGenerateResponse {
        success: true,
        provider: generation.provider,
        model: generation.model,
        content: generation.content,
    }))
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentRequest {
    pub prompt: String,
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateContentResponse {
    pub success: bool,
    pub content: String,
    pub content_type: ContentType,
}

/// POST /api/generate-content
pub async fn generate_content(
    State(state): State<AppState>,
    client: ClientAddress,
    Json(request): Json<GenerateContentRequest>,
) -> Result<Json<GenerateContentResponse>, ApiError> {
    enforce_rate_limit(&state, &client, &RatePolicy::api(&state.rate_limits)).await?;
    require_text(&request.prompt, "prompt")?;

    let content_type = request
        .content_type
        .as_deref()
        .map(ContentType::parse_lenient)
        .unwrap_or_default();

    let generation = state
        .content
        .generate(&request.prompt, content_type, request.provider.as_deref())
        .await?;

    Ok(Json(GenerateContentResponse {
        success: true,
        content: generation.content,
        content_type,
    }))
}

#[derive(Debug, Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateImageResponse {
    pub success: bool,
    pub image_url: Option<String>,
}

/// POST /api/generate-image
pub async fn generate_image(
    State(state): State<AppState>,
    client: ClientAddress,
    Json(request): Json<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, ApiError> {
    enforce_rate_limit(&state, &client, &RatePolicy::api(&state.rate_limits)).await?;
    require_text(&request.prompt, "prompt")?;

    let image = state.content.generate_image(&request.prompt).await?;

    Ok(Json(GenerateImageResponse {
        success: true,
        image_url: image.url,
    }))
}

#[derive(Debug, Deserialize)]
pub struct OperatorRequest {
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub preferences: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct OperatorResponse {
    pub success: bool,
    pub analysis: IntentAnalysis,
    pub result: OperatorOutput,
}

/// POST /api/ai-operator
pub async fn ai_operator(
    State(state): State<AppState>,
    client: ClientAddress,
    Json(request): Json<OperatorRequest>,
) -> Result<Json<OperatorResponse>, ApiError> {
    enforce_rate_limit(&state, &client, &RatePolicy::api(&state.rate_limits)).await?;

    let style = style_from_preferences(request.preferences.as_ref());
    let outcome = state
        .operator
        .process(&request.intent, style.as_deref())
        .await?;

    Ok(Json(OperatorResponse {
        success: true,
        analysis: outcome.analysis,
        result: outcome.result,
    }))
}
