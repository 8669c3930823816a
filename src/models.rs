use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// Longest address SMTP will carry
const MAX_EMAIL_LEN: usize = 254;

// Contact form submission body
#[derive(Deserialize, Debug, Default)]
pub struct SubmitRequest {
    #[serde(default)]
    pub email: Option<String>,
}

impl SubmitRequest {
    pub fn into_lead(self) -> Result<Lead, ValidationError> {
        let email = self.email.as_deref().map(str::trim).unwrap_or_default();
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        if !is_plausible_email(email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(Lead {
            email: email.to_string(),
            received_at: Utc::now(),
        })
    }
}

// Only rules out what would break the outgoing mails, real checking is the mailbox's job
fn is_plausible_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return false;
    }
    match email.rsplit_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

// A validated submission handed to the dispatcher
#[derive(Serialize, Debug, Clone)]
pub struct Lead {
    pub email: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

impl SubmitResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// Body of GET /cooldown-status
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    pub restricted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<bool>,
}
