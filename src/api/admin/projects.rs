//! Project lifecycle admin endpoints

use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::api::middleware::RequireAdmin;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{Project, ProjectId, ProjectStatus};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// PUT /admin/projects/{project_id}/status
pub async fn update_project_status(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(project_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Project>, ApiError> {
    let id: ProjectId = project_id.parse()?;
    let status: ProjectStatus = request.status.parse()?;
    debug!(project_id = %id, status = ?status, admin = %claims.sub, "Admin updating project status");

    let project = state.projects.update_status(&id, status).await?;
    Ok(Json(project))
}

/// DELETE /admin/projects/{project_id}
pub async fn delete_project(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    Path(project_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id: ProjectId = project_id.parse()?;
    debug!(project_id = %id, admin = %claims.sub, "Admin deleting project");

    state.projects.delete(&id).await?;

    Ok(Json(serde_json::json!({
        "deleted": true,
        "id": id
    })))
}
