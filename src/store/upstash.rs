//! Upstash Redis over its REST interface.
//!
//! Each command is POSTed as a JSON array (`["SET", key, value, "NX", "EX", 600]`)
//! with a bearer token. Replies are `{"result": ...}` on success and
//! `{"error": "..."}` on failure.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

use super::{CooldownStore, SENTINEL, StoreError, expiry_secs};

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

pub struct UpstashStore {
    client: reqwest::Client,
    url: String,
    token: String,
}

impl UpstashStore {
    pub fn new(client: reqwest::Client, url: &str, token: &str) -> Self {
        Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    async fn command(&self, args: Value) -> Result<Option<Value>, StoreError> {
        debug!(command = %args[0], "Sending store command");

        let res = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(&args)
            .send()
            .await?;

        let status = res.status();
        let reply: Reply = res.json().await?;
        decode_reply(status.is_success(), reply)
    }
}

fn decode_reply(success: bool, reply: Reply) -> Result<Option<Value>, StoreError> {
    if let Some(err) = reply.error {
        return Err(StoreError::Backend(err));
    }
    if !success {
        return Err(StoreError::Protocol("error status without error message".to_string()));
    }
    Ok(reply.result)
}

// SET NX answers "OK" when it wrote and null when the key already existed
fn decode_set_nx(result: Option<Value>) -> Result<bool, StoreError> {
    match result {
        None | Some(Value::Null) => Ok(false),
        Some(Value::String(s)) if s == "OK" => Ok(true),
        Some(other) => Err(StoreError::Protocol(format!("SET NX returned {other}"))),
    }
}

// TTL answers -2 for a missing key and -1 for a key without expiry. A record
// without expiry would refuse every claim forever, so it is not reported as open.
fn decode_ttl(result: Option<Value>) -> Result<Option<u64>, StoreError> {
    let ttl = result
        .as_ref()
        .and_then(Value::as_i64)
        .ok_or_else(|| StoreError::Protocol(format!("TTL returned {result:?}")))?;
    match ttl {
        -2 | 0 => Ok(None),
        -1 => Err(StoreError::Protocol("cooldown record has no expiry".to_string())),
        secs if secs > 0 => Ok(Some(secs as u64)),
        other => Err(StoreError::Protocol(format!("TTL returned {other}"))),
    }
}

#[async_trait]
impl CooldownStore for UpstashStore {
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let secs = expiry_secs(ttl)?;
        let result = self.command(json!(["SET", key, SENTINEL, "NX", "EX", secs])).await?;
        decode_set_nx(result)
    }

    async fn ttl_secs(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let result = self.command(json!(["TTL", key])).await?;
        decode_ttl(result)
    }
}
