use axum::{Json, extract::State};
use std::sync::Arc;

use crate::identity::CallerIdentity;
use crate::models::StatusResponse;
use crate::state::AppState;

// Always 200, degraded store is reported in the body
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
) -> Json<StatusResponse> {
    let status = state.gate.check_status(&identity).await;
    Json(status.into())
}
