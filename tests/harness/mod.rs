//! Stand-in stores and dispatchers for driving the gate through failures.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use contact_gateway::{
    cooldown::{CooldownGate, GateSettings},
    dispatch::{DispatchError, Dispatcher},
    models::Lead,
    state::AppState,
    store::{CooldownStore, MemoryStore, StoreError},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Every call fails as if the store were down.
pub struct UnreachableStore;

#[async_trait]
impl CooldownStore for UnreachableStore {
    async fn set_if_absent(&self, _key: &str, _ttl: Duration) -> Result<bool, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn ttl_secs(&self, _key: &str) -> Result<Option<u64>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
}

/// Never answers.
pub struct HangingStore;

#[async_trait]
impl CooldownStore for HangingStore {
    async fn set_if_absent(&self, _key: &str, _ttl: Duration) -> Result<bool, StoreError> {
        std::future::pending().await
    }

    async fn ttl_secs(&self, _key: &str) -> Result<Option<u64>, StoreError> {
        std::future::pending().await
    }
}

/// Wraps a store and counts calls.
pub struct CountingStore<S> {
    pub inner: S,
    pub calls: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: CooldownStore> CooldownStore for CountingStore<S> {
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set_if_absent(key, ttl).await
    }

    async fn ttl_secs(&self, key: &str) -> Result<Option<u64>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.ttl_secs(key).await
    }
}

/// Records leads and optionally fails every dispatch.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub fail: bool,
    pub leads: Mutex<Vec<String>>,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub async fn count(&self) -> usize {
        self.leads.lock().await.len()
    }
}

#[async_trait]
impl Dispatcher for RecordingDispatcher {
    async fn dispatch(&self, lead: &Lead) -> Result<(), DispatchError> {
        self.leads.lock().await.push(lead.email.clone());
        if self.fail {
            return Err(DispatchError::Delivery(vec![
                "lead alert: smtp down".to_string(),
                "acknowledgement: smtp down".to_string(),
            ]));
        }
        Ok(())
    }
}

/// Never finishes sending.
pub struct StalledDispatcher;

#[async_trait]
impl Dispatcher for StalledDispatcher {
    async fn dispatch(&self, _lead: &Lead) -> Result<(), DispatchError> {
        std::future::pending().await
    }
}

pub fn gate(store: Arc<dyn CooldownStore>, dispatcher: Arc<dyn Dispatcher>) -> CooldownGate {
    CooldownGate::new(store, dispatcher, GateSettings::default())
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve_local(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn memory_state(dispatcher: Arc<dyn Dispatcher>) -> Arc<AppState> {
    AppState::new(gate(Arc::new(MemoryStore::new()), dispatcher))
}
