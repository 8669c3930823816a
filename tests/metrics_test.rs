//! Counters are process wide, so this binary holds a single test.

mod harness;

use async_trait::async_trait;
use contact_gateway::{
    dispatch::LogDispatcher,
    error::GateError,
    identity::CallerIdentity,
    metrics::{CLAIMS_ADMITTED, CLAIMS_REJECTED, DEGRADED_READS, STATUS_CHECKS, STORE_ERRORS},
    models::SubmitRequest,
    store::{CooldownStore, StoreError},
};
use harness::gate;
use std::sync::Arc;
use std::time::Duration;

/// Every claim loses and the remaining lifetime cannot be read.
struct TakenUnreadableStore;

#[async_trait]
impl CooldownStore for TakenUnreadableStore {
    async fn set_if_absent(&self, _key: &str, _ttl: Duration) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn ttl_secs(&self, _key: &str) -> Result<Option<u64>, StoreError> {
        Err(StoreError::Backend("LOADING".to_string()))
    }
}

#[tokio::test]
async fn refused_submission_is_not_counted_as_a_status_check() {
    let gate = gate(Arc::new(TakenUnreadableStore), Arc::new(LogDispatcher));
    let request = SubmitRequest {
        email: Some("visitor@example.com".to_string()),
    };

    let status_checks = STATUS_CHECKS.get();
    let degraded = DEGRADED_READS.get();
    let rejected = CLAIMS_REJECTED.get();
    let admitted = CLAIMS_ADMITTED.get();
    let store_errors = STORE_ERRORS.get();

    let err = gate
        .submit(&CallerIdentity::new("1.2.3.4"), request)
        .await
        .unwrap_err();

    // unreadable ttl falls back to the whole window
    assert!(matches!(
        err,
        GateError::RateLimited {
            retry_after_secs: 600,
            window_secs: 600
        }
    ));
    assert_eq!(STATUS_CHECKS.get(), status_checks);
    assert_eq!(DEGRADED_READS.get(), degraded);
    assert_eq!(CLAIMS_REJECTED.get(), rejected + 1.0);
    assert_eq!(CLAIMS_ADMITTED.get(), admitted);
    assert_eq!(STORE_ERRORS.get(), store_errors + 1.0);
}
