//! Backing stores for cooldown records.
//!
//! The gate only needs two things from a store: an atomic "create if absent
//! with expiry" and a read of the remaining lifetime. Correctness across
//! instances depends entirely on the first one being atomic on the store
//! side, so implementations must never emulate it with a read followed by a
//! write.

mod memory;
mod upstash;

pub use memory::MemoryStore;
pub use upstash::UpstashStore;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Value written for every cooldown record. Only the key and its expiry matter.
pub const SENTINEL: &str = "1";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store rejected command: {0}")]
    Backend(String),

    #[error("unexpected store reply: {0}")]
    Protocol(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("unusable record expiry {0:?}")]
    InvalidExpiry(Duration),
}

// Redis expiries are whole seconds, anything shorter would never hold a claim
pub(crate) fn expiry_secs(ttl: Duration) -> Result<u64, StoreError> {
    match ttl.as_secs() {
        0 => Err(StoreError::InvalidExpiry(ttl)),
        secs => Ok(secs),
    }
}

#[async_trait]
pub trait CooldownStore: Send + Sync {
    /// Create `key` with a `ttl` expiry unless it already exists.
    ///
    /// Returns `true` only for the call that created the record.
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Remaining lifetime of `key` in whole seconds, `None` when absent or expired.
    async fn ttl_secs(&self, key: &str) -> Result<Option<u64>, StoreError>;
}
