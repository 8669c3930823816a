use std::sync::Arc;

use crate::config::Args;
use crate::cooldown::{CooldownGate, GateSettings};
use crate::dispatch::{Dispatcher, LogDispatcher, MailApiDispatcher, MailSettings};
use crate::store::{CooldownStore, MemoryStore, UpstashStore};
use tracing::warn;

// app's shared state
pub struct AppState {
    pub gate: CooldownGate,
    // kept so main can purge it, None when a shared store is in use
    pub memory_store: Option<Arc<MemoryStore>>,
}

impl AppState {
    pub fn new(gate: CooldownGate) -> Arc<Self> {
        Arc::new(Self {
            gate,
            memory_store: None,
        })
    }

    // Wire the store and dispatcher picked by the configuration
    pub fn from_args(args: &Args) -> Arc<Self> {
        let client = reqwest::Client::new();

        let mut memory_store = None;
        let store: Arc<dyn CooldownStore> = match args.upstash_credentials() {
            Some((url, token)) => Arc::new(UpstashStore::new(client.clone(), url, token)),
            None => {
                warn!(
                    "UPSTASH_REDIS_REST_URL/TOKEN not set, \
                     cooldowns are kept in memory for this instance only"
                );
                let memory = Arc::new(MemoryStore::new());
                memory_store = Some(Arc::clone(&memory));
                memory
            }
        };

        let dispatcher: Arc<dyn Dispatcher> = match args.mail_api_key.as_deref() {
            Some(key) if !key.is_empty() => Arc::new(MailApiDispatcher::new(
                client,
                &args.mail_api_url,
                key,
                MailSettings {
                    from: args.mail_from.clone(),
                    admin_to: args.admin_address().to_string(),
                    signature: args.mail_signature.clone(),
                },
            )),
            _ => {
                warn!("MAIL_API_KEY not set, leads are logged instead of mailed");
                Arc::new(LogDispatcher)
            }
        };

        let settings = GateSettings {
            key_prefix: args.key_prefix.clone(),
            window: args.cooldown_window(),
            store_timeout: args.store_timeout(),
            dispatch_timeout: args.dispatch_timeout(),
        };

        Arc::new(Self {
            gate: CooldownGate::new(store, dispatcher, settings),
            memory_store,
        })
    }
}
