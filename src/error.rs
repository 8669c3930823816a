use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::models::SubmitResponse;
use crate::store::StoreError;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Email is required")]
    MissingEmail,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Invalid request body")]
    MalformedBody,
}

#[derive(Error, Debug)]
pub enum GateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("cooldown active for {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
        window_secs: u64,
    },

    #[error("cooldown store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("notification dispatch failed: {0}")]
    DispatchFailure(#[from] DispatchError),
}

impl GateError {
    pub fn status(&self) -> StatusCode {
        match self {
            GateError::Validation(_) => StatusCode::BAD_REQUEST,
            GateError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GateError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            GateError::DispatchFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Caller facing text, internal details stay in the logs
    pub fn public_message(&self) -> String {
        match self {
            GateError::Validation(err) => err.to_string(),
            GateError::RateLimited { window_secs, .. } => {
                let minutes = window_secs.div_ceil(60).max(1);
                let unit = if minutes == 1 { "minute" } else { "minutes" };
                format!("Rate limit exceeded. Please wait {minutes} {unit}.")
            }
            GateError::StoreUnavailable(_) => "Contact service temporarily unavailable".to_string(),
            GateError::DispatchFailure(_) => "Failed to send signal".to_string(),
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(SubmitResponse::failed(self.public_message()));
        let mut response = (status, body).into_response();

        if let GateError::RateLimited { retry_after_secs, .. } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}
