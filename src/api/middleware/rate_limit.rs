//! Per-address request budgets

use tracing::warn;

use super::ClientAddress;
use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::api_key::RatePolicy;

/// Count a request against `policy`. A limiter backend failure lets the
/// request through.
pub async fn enforce_rate_limit(
    state: &AppState,
    client: &ClientAddress,
    policy: &RatePolicy,
) -> Result<(), ApiError> {
    match state.rate_limiter.check_and_record(&client.0, policy).await {
        Ok(result) if result.allowed => Ok(()),
        Ok(result) => {
            warn!(client = %client.0, action = policy.action, "Rate limit exceeded");
            Err(ApiError::rate_limited(result.message()).with_retry_after(result.reset_in_seconds))
        }
        Err(e) => {
            warn!(error = %e, action = policy.action, "Rate limiter unavailable");
            Ok(())
        }
    }
}
