//! Upstash store and gate against a local stand-in for the REST endpoint.

mod harness;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    routing::post,
};
use contact_gateway::{
    cooldown::CooldownStatus,
    dispatch::LogDispatcher,
    identity::CallerIdentity,
    store::{CooldownStore, StoreError, UpstashStore},
};
use harness::{gate, serve_local};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const TOKEN: &str = "upstash_test_token";

/// Keeps keys without expiring them; every set key reports 600s left.
#[derive(Default)]
struct RedisRest {
    wrong_password: bool,
    commands: Mutex<Vec<Value>>,
    auth: Mutex<Vec<String>>,
    keys: Mutex<HashMap<String, u64>>,
}

async fn run_command(
    State(redis): State<Arc<RedisRest>>,
    headers: HeaderMap,
    Json(command): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    redis.auth.lock().await.push(auth.to_string());
    redis.commands.lock().await.push(command.clone());

    if redis.wrong_password {
        let body = json!({"error": "WRONGPASS invalid or missing auth token"});
        return (StatusCode::UNAUTHORIZED, Json(body));
    }

    let key = command[1].as_str().unwrap_or_default().to_string();
    let mut keys = redis.keys.lock().await;
    let result = match command[0].as_str() {
        Some("SET") if keys.contains_key(&key) => Value::Null,
        Some("SET") => {
            keys.insert(key, command[5].as_u64().unwrap_or_default());
            json!("OK")
        }
        Some("TTL") => json!(keys.get(&key).map(|&ttl| ttl as i64).unwrap_or(-2)),
        _ => return (StatusCode::BAD_REQUEST, Json(json!({"error": "ERR unknown command"}))),
    };
    (StatusCode::OK, Json(json!({ "result": result })))
}

async fn store_for(redis: Arc<RedisRest>) -> UpstashStore {
    let router = Router::new()
        .route("/", post(run_command))
        .with_state(redis);
    let base = serve_local(router).await;
    // trailing slash must not change the command URL
    UpstashStore::new(reqwest::Client::new(), &format!("{base}/"), TOKEN)
}

#[tokio::test]
async fn gate_sends_set_nx_ex_then_ttl() {
    let redis = Arc::new(RedisRest::default());
    let store = Arc::new(store_for(redis.clone()).await);
    let gate = gate(store, Arc::new(LogDispatcher));
    let id = CallerIdentity::new("1.2.3.4");

    assert!(gate.attempt_claim(&id, gate.window()).await.unwrap());
    assert!(!gate.attempt_claim(&id, gate.window()).await.unwrap());
    assert_eq!(
        gate.check_status(&id).await,
        CooldownStatus::Cooling { ttl_secs: 600 }
    );

    let commands = redis.commands.lock().await;
    assert_eq!(
        commands[0],
        json!(["SET", "contact_limit:1.2.3.4", "1", "NX", "EX", 600])
    );
    assert_eq!(commands[1], commands[0]);
    assert_eq!(commands[2], json!(["TTL", "contact_limit:1.2.3.4"]));
    assert_eq!(commands.len(), 3);

    for auth in redis.auth.lock().await.iter() {
        assert_eq!(auth, &format!("Bearer {TOKEN}"));
    }
}

#[tokio::test]
async fn missing_key_reads_as_open() {
    let store = store_for(Arc::new(RedisRest::default())).await;
    assert_eq!(store.ttl_secs("contact_limit:5.6.7.8").await.unwrap(), None);
}

#[tokio::test]
async fn wrong_password_is_a_backend_error() {
    let redis = Arc::new(RedisRest {
        wrong_password: true,
        ..Default::default()
    });
    let store = store_for(redis.clone()).await;

    let err = store
        .set_if_absent("contact_limit:1.2.3.4", Duration::from_secs(600))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Backend(ref msg) if msg.starts_with("WRONGPASS")));

    let err = store.ttl_secs("contact_limit:1.2.3.4").await.unwrap_err();
    assert!(matches!(err, StoreError::Backend(_)));
}

#[tokio::test]
async fn wrong_password_fails_claims_closed_and_status_open() {
    let redis = Arc::new(RedisRest {
        wrong_password: true,
        ..Default::default()
    });
    let store = Arc::new(store_for(redis).await);
    let gate = gate(store, Arc::new(LogDispatcher));
    let id = CallerIdentity::new("1.2.3.4");

    assert!(gate.attempt_claim(&id, gate.window()).await.is_err());
    assert_eq!(gate.check_status(&id).await, CooldownStatus::Degraded);
}

#[tokio::test]
async fn sub_second_expiry_never_reaches_the_wire() {
    let redis = Arc::new(RedisRest::default());
    let store = store_for(redis.clone()).await;

    let err = store
        .set_if_absent("contact_limit:1.2.3.4", Duration::from_millis(500))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidExpiry(_)));
    assert!(redis.commands.lock().await.is_empty());
}
