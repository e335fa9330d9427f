//! Administrator login

use axum::{extract::State, routing::post, Router};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{enforce_rate_limit, ClientAddress};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::infrastructure::api_key::RatePolicy;

pub fn create_auth_router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds
    pub expires_in: i64,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientAddress,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    enforce_rate_limit(&state, &client, &RatePolicy::auth(&state.rate_limits)).await?;

    let token = state.admin_auth.login(&request.username, &request.password)?;

    Ok(Json(LoginResponse {
        token: token.token,
        token_type: "Bearer",
        expires_in: token.expires_in,
    }))
}
