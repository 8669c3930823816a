//! Per-caller submission cooldown.
//!
//! A caller is either open or cooling down. The only transition the gate ever
//! makes is open -> cooling, through a single atomic "set if absent with
//! expiry" in the shared store. Going back to open happens when the store
//! expires the record; the gate never deletes or rewrites one.
//!
//! Store outages are handled differently on the two paths:
//! - status reads degrade open and say so (`CooldownStatus::Degraded`)
//! - claims fail closed, an outage never counts as an admission
//!
//! A dispatch failure after admission keeps the cooldown in place.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::dispatch::{DispatchError, Dispatcher};
use crate::error::GateError;
use crate::identity::CallerIdentity;
use crate::metrics::{
    CLAIMS_ADMITTED, CLAIMS_REJECTED, DEGRADED_READS, DISPATCH_FAILURES, STATUS_CHECKS,
    STORE_ERRORS, SUBMIT_LATENCY,
};
use crate::models::{Lead, StatusResponse, SubmitRequest};
use crate::store::{CooldownStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    Open,
    Cooling { ttl_secs: u64 },
    // store unreachable, caller is let through but told about it
    Degraded,
}

impl CooldownStatus {
    pub fn is_restricted(&self) -> bool {
        matches!(self, CooldownStatus::Cooling { .. })
    }
}

impl From<CooldownStatus> for StatusResponse {
    fn from(status: CooldownStatus) -> Self {
        match status {
            CooldownStatus::Open => StatusResponse {
                restricted: false,
                ttl: None,
                degraded: None,
            },
            CooldownStatus::Cooling { ttl_secs } => StatusResponse {
                restricted: true,
                ttl: Some(ttl_secs),
                degraded: None,
            },
            CooldownStatus::Degraded => StatusResponse {
                restricted: false,
                ttl: None,
                degraded: Some(true),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct GateSettings {
    pub key_prefix: String,
    pub window: Duration,
    pub store_timeout: Duration,
    pub dispatch_timeout: Duration,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            key_prefix: crate::config::DEFAULT_KEY_PREFIX.to_string(),
            window: Duration::from_secs(crate::config::DEFAULT_COOLDOWN_SECS),
            store_timeout: Duration::from_secs(2),
            dispatch_timeout: Duration::from_secs(10),
        }
    }
}

pub struct CooldownGate {
    store: Arc<dyn CooldownStore>,
    dispatcher: Arc<dyn Dispatcher>,
    settings: GateSettings,
}

impl CooldownGate {
    pub fn new(
        store: Arc<dyn CooldownStore>,
        dispatcher: Arc<dyn Dispatcher>,
        settings: GateSettings,
    ) -> Self {
        Self {
            store,
            dispatcher,
            settings,
        }
    }

    pub fn window(&self) -> Duration {
        self.settings.window
    }

    pub fn key_for(&self, identity: &CallerIdentity) -> String {
        format!("{}{}", self.settings.key_prefix, identity.as_str())
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        let result = match timeout(self.settings.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout(self.settings.store_timeout)),
        };
        if result.is_err() {
            STORE_ERRORS.inc();
        }
        result
    }

    /// Remaining cooldown for `identity`. Never fails; a store outage is
    /// reported as [`CooldownStatus::Degraded`].
    pub async fn check_status(&self, identity: &CallerIdentity) -> CooldownStatus {
        STATUS_CHECKS.inc();
        let key = self.key_for(identity);

        match self.bounded(self.store.ttl_secs(&key)).await {
            Ok(Some(ttl_secs)) => CooldownStatus::Cooling { ttl_secs },
            Ok(None) => CooldownStatus::Open,
            Err(e) => {
                DEGRADED_READS.inc();
                warn!(
                    caller = %identity.fingerprint(),
                    error = %e,
                    "Cooldown store unreachable, reporting degraded"
                );
                CooldownStatus::Degraded
            }
        }
    }

    /// One atomic claim. `Ok(true)` only for the call that created the record.
    pub async fn attempt_claim(
        &self,
        identity: &CallerIdentity,
        window: Duration,
    ) -> Result<bool, StoreError> {
        let key = self.key_for(identity);
        let admitted = self.bounded(self.store.set_if_absent(&key, window)).await?;

        if admitted {
            CLAIMS_ADMITTED.inc();
            debug!(
                caller = %identity.fingerprint(),
                window_secs = window.as_secs(),
                "Cooldown claimed"
            );
        } else {
            CLAIMS_REJECTED.inc();
        }
        Ok(admitted)
    }

    /// Hand an admitted lead to the dispatcher. The claim stays either way.
    pub async fn on_admitted(
        &self,
        identity: &CallerIdentity,
        lead: &Lead,
    ) -> Result<(), DispatchError> {
        let limit = self.settings.dispatch_timeout;
        let result = match timeout(limit, self.dispatcher.dispatch(lead)).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout(limit)),
        };

        if let Err(e) = &result {
            DISPATCH_FAILURES.inc();
            error!(
                caller = %identity.fingerprint(),
                error = %e,
                "Dispatch failed, cooldown kept"
            );
        }
        result
    }

    /// Validate, claim and dispatch one submission.
    pub async fn submit(
        &self,
        identity: &CallerIdentity,
        request: SubmitRequest,
    ) -> Result<(), GateError> {
        let start_time = Instant::now();
        let result = self.submit_inner(identity, request).await;
        SUBMIT_LATENCY.observe(start_time.elapsed().as_secs_f64());
        result
    }

    async fn submit_inner(
        &self,
        identity: &CallerIdentity,
        request: SubmitRequest,
    ) -> Result<(), GateError> {
        let lead = request.into_lead()?;
        let window = self.settings.window;

        let admitted = self.attempt_claim(identity, window).await.inspect_err(|e| {
            error!(
                caller = %identity.fingerprint(),
                error = %e,
                "Cooldown claim failed, refusing submission"
            );
        })?;

        if !admitted {
            let retry_after_secs = self.retry_hint(identity).await;
            info!(
                caller = %identity.fingerprint(),
                retry_after_secs,
                "Submission refused, caller cooling down"
            );
            return Err(GateError::RateLimited {
                retry_after_secs,
                window_secs: window.as_secs(),
            });
        }

        self.on_admitted(identity, &lead).await?;
        info!(caller = %identity.fingerprint(), "Submission admitted and dispatched");
        Ok(())
    }

    // Best effort, falls back to the whole window. Reads the store directly so
    // refusals do not show up as status checks.
    async fn retry_hint(&self, identity: &CallerIdentity) -> u64 {
        let key = self.key_for(identity);
        match self.bounded(self.store.ttl_secs(&key)).await {
            Ok(Some(ttl_secs)) => ttl_secs,
            Ok(None) | Err(_) => self.settings.window.as_secs(),
        }
    }
}
