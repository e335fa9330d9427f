//! Admin endpoints for key and project lifecycle

pub mod api_keys;
pub mod projects;

use axum::{
    routing::{get, post, put},
    Router,
};

use super::state::AppState;

pub fn create_admin_router() -> Router<AppState> {
    Router::new()
        // API key management
        .route("/api-keys", get(api_keys::list_api_keys))
        .route(
            "/api-keys/{client_id}",
            get(api_keys::get_api_key).delete(api_keys::delete_api_key),
        )
        .route("/api-keys/{client_id}/suspend", post(api_keys::suspend_api_key))
        .route("/api-keys/{client_id}/activate", post(api_keys::activate_api_key))
        .route("/api-keys/{client_id}/revoke", post(api_keys::revoke_api_key))
        // Projects
        .route("/projects/{project_id}/status", put(projects::update_project_status))
        .route(
            "/projects/{project_id}",
            axum::routing::delete(projects::delete_project),
        )
}
