mod health;
mod metrics;
mod status;
mod submit;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use status::status_handler;
pub use submit::submit_handler;
