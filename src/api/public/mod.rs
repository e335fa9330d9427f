//! Public `/api` endpoints

pub mod generation;
pub mod keys;
pub mod models;
pub mod platform;
pub mod projects;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

pub fn create_public_router() -> Router<AppState> {
    Router::new()
        // Platform
        .route("/health", get(platform::health))
        .route("/ping", get(platform::ping))
        .route("/platform/status", get(platform::status))
        .route("/providers", get(platform::providers))
        // Generation
        .route("/ai/generate", post(generation::ai_generate))
        .route("/generate-content", post(generation::generate_content))
        .route("/generate-image", post(generation::generate_image))
        .route("/ai-operator", post(generation::ai_operator))
        // API keys
        .route("/keys/generate", post(keys::generate_key))
        .route("/keys/{api_key}/usage", get(keys::key_usage))
        // Business models
        .route("/models/available", get(models::available_models))
        .route("/models/execute", post(models::execute_model))
        // Projects
        .route("/project/initialize", post(projects::initialize_project))
        .route("/projects", get(projects::list_projects))
        .route("/projects/{project_id}", get(projects::get_project))
}

/// Blank strings count as missing
pub(crate) fn require_text(value: &str, field: &str) -> Result<(), super::types::ApiError> {
    if value.trim().is_empty() {
        return Err(super::types::ApiError::bad_request(format!(
            "Missing required field: {}",
            field
        )));
    }
    Ok(())
}
