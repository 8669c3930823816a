//! Contact form endpoint guarded by a per-caller submission cooldown.
//!
//! Every caller (keyed by the first `X-Forwarded-For` entry) may get one
//! submission through per cooldown window. The cooldown lives in a shared
//! key-value store and is claimed with a single atomic set-if-absent, so any
//! number of stateless instances can serve the same site.
//!
//! Routes:
//! - `GET /cooldown-status` reports `{restricted, ttl?, degraded?}`
//! - `POST /submit` takes `{email}` and sends the lead mails once admitted
//! - `GET|POST /api/contact` serve the same two handlers
//! - `GET /health`, `GET /metrics`

pub mod config;
pub mod cooldown;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod models;
pub mod state;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use handlers::{health_handler, metrics_handler, status_handler, submit_handler};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/cooldown-status", get(status_handler))
        .route("/submit", post(submit_handler))
        .route("/api/contact", get(status_handler).post(submit_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
