use lazy_static::lazy_static;
use prometheus::{Counter, Histogram, register_counter, register_histogram};

lazy_static! {
    pub static ref STATUS_CHECKS: Counter =
        register_counter!("contact_status_checks_total", "Total cooldown status checks").unwrap();
    pub static ref DEGRADED_READS: Counter = register_counter!(
        "contact_degraded_reads_total",
        "Status checks answered without the store"
    )
    .unwrap();
    pub static ref CLAIMS_ADMITTED: Counter = register_counter!(
        "contact_claims_admitted_total",
        "Submissions that won the cooldown claim"
    )
    .unwrap();
    pub static ref CLAIMS_REJECTED: Counter = register_counter!(
        "contact_claims_rejected_total",
        "Submissions refused while cooling down"
    )
    .unwrap();
    pub static ref STORE_ERRORS: Counter =
        register_counter!("contact_store_errors_total", "Failed or timed out store calls").unwrap();
    pub static ref DISPATCH_FAILURES: Counter = register_counter!(
        "contact_dispatch_failures_total",
        "Admitted submissions whose mails failed"
    )
    .unwrap();
    pub static ref SUBMIT_LATENCY: Histogram = register_histogram!(
        "contact_submit_latency_seconds",
        "Submit handler latency in seconds"
    )
    .unwrap();
}
