use clap::Parser;
use std::time::Duration;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use contact_gateway::{app, config::Args, state::AppState};

// how often expired in-memory cooldowns are dropped
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let state = AppState::from_args(&args);

    // only the in-memory store needs sweeping, the shared one expires keys itself
    if let Some(memory) = state.memory_store.clone() {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PURGE_INTERVAL);
            loop {
                interval.tick().await;
                memory.purge_expired();
            }
        });
    }

    let router = app(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        addr = %addr,
        cooldown_secs = args.cooldown_secs,
        key_prefix = %args.key_prefix,
        shared_store = args.upstash_credentials().is_some(),
        "Contact gateway listening"
    );

    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
