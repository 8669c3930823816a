use axum::{extract::FromRequestParts, http::HeaderMap, http::request::Parts};
use sha2::{Digest, Sha256};
use std::convert::Infallible;
use std::fmt;

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const LOOPBACK_IDENTITY: &str = "127.0.0.1";

/// Who is calling, as far as the forwarding proxy tells us.
///
/// Taken from the first entry of `X-Forwarded-For`. Nothing authenticates
/// it, so a client talking to the service directly can pick any value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Self(LOOPBACK_IDENTITY.to_string())
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let first = headers
            .get(FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .unwrap_or_default();
        Self::new(first)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Short hash for log lines so raw addresses stay out of the logs
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        digest[..12].to_string()
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<S> FromRequestParts<S> for CallerIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
