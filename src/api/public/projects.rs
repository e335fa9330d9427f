//! Project initialization and lookup

use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::require_text;
use crate::api::middleware::{enforce_rate_limit, ClientAddress};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Project, ProjectId};
use crate::infrastructure::api_key::RatePolicy;
use crate::infrastructure::services::InitializeProject;

#[derive(Debug, Deserialize)]
pub struct InitializeProjectRequest {
    pub industry: String,
    #[serde(default)]
    pub project_data: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InitializeProjectResponse {
    pub success: bool,
    pub project: Project,
    pub raw_response: String,
}

/// POST /api/project/initialize
pub async fn initialize_project(
    State(state): State<AppState>,
    client: ClientAddress,
    Json(request): Json<InitializeProjectRequest>,
) -> Result<Json<InitializeProjectResponse>, ApiError> {
    enforce_rate_limit(&state, &client, &RatePolicy::api(&state.rate_limits)).await?;
    require_text(&request.industry, "industry")?;

    let initialized = state
        .projects
        .initialize(InitializeProject {
            industry: request.industry,
            project_data: request.project_data,
            name: request.name,
            description: request.description,
            created_by: Some(client.0),
        })
        .await?;

    Ok(Json(InitializeProjectResponse {
        success: true,
        project: initialized.project,
        raw_response: initialized.raw_response,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProjectsResponse {
    pub success: bool,
    pub projects: Vec<Project>,
    pub total: usize,
}

/// GET /api/projects
pub async fn list_projects(State(state): State<AppState>) -> Result<Json<ProjectsResponse>, ApiError> {
    let projects = state.projects.list().await?;

    Ok(Json(ProjectsResponse {
        success: true,
        total: projects.len(),
        projects,
    }))
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub success: bool,
    pub project: Project,
}

/// GET /api/projects/{project_id}
pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let id: ProjectId = project_id.parse()?;
    let project = state.projects.get(&id).await?;

    Ok(Json(ProjectResponse {
        success: true,
        project,
    }))
}
