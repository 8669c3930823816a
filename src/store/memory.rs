use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use super::{CooldownStore, StoreError, expiry_secs};

/// Process-local store with the same claim contract as the shared one.
///
/// Atomicity comes from the shard lock held by `DashMap::entry`. Only safe as
/// the single source of truth when one instance serves all traffic.
#[derive(Default)]
pub struct MemoryStore {
    records: DashMap<String, Instant>, // key -> expires_at
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // Drop records whose expiry has passed, returns how many went away
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.records.len();
        self.records.retain(|_, expires_at| *expires_at > now);
        let purged = before.saturating_sub(self.records.len());
        if purged > 0 {
            debug!(purged, "Purged expired cooldown records");
        }
        purged
    }
}

#[async_trait]
impl CooldownStore for MemoryStore {
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        expiry_secs(ttl)?;
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).ok_or(StoreError::InvalidExpiry(ttl))?;

        match self.records.entry(key.to_string()) {
            // expired but not purged yet counts as absent
            Entry::Occupied(mut entry) if *entry.get() <= now => {
                entry.insert(expires_at);
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
                Ok(true)
            }
        }
    }

    async fn ttl_secs(&self, key: &str) -> Result<Option<u64>, StoreError> {
        let now = Instant::now();
        let Some(expires_at) = self.records.get(key).map(|e| *e.value()) else {
            return Ok(None);
        };
        if expires_at <= now {
            return Ok(None);
        }
        // round up so a live record never reports zero
        let remaining = expires_at - now;
        let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        Ok(Some(secs))
    }
}
