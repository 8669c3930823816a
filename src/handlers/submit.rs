use axum::{Json, body::Bytes, extract::State};
use std::sync::Arc;

use crate::error::{GateError, ValidationError};
use crate::identity::CallerIdentity;
use crate::models::{SubmitRequest, SubmitResponse};
use crate::state::AppState;

pub const SUCCESS_MESSAGE: &str = "Uplink established";

// Body is parsed by hand so a bad payload still gets the JSON error shape
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    body: Bytes,
) -> Result<Json<SubmitResponse>, GateError> {
    let request = parse_body(&body)?;
    state.gate.submit(&identity, request).await?;
    Ok(Json(SubmitResponse::ok(SUCCESS_MESSAGE)))
}

fn parse_body(body: &[u8]) -> Result<SubmitRequest, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SubmitRequest::default());
    }
    serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)
}
