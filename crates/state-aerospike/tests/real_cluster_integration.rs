//! Integration tests for the Aerospike state store against a real cluster.
//!
//! These tests require a running Aerospike server. They are skipped unless
//! the `RUN_AEROSPIKE_INTEGRATION_TESTS` environment variable is set.
//!
//! # Running the tests
//!
//! ```bash
//! docker run -d --name aerospike -p 3000-3002:3000-3002 aerospike/aerospike-server
//!
//! RUN_AEROSPIKE_INTEGRATION_TESTS=1 \
//! AEROSPIKE_HOSTS=127.0.0.1:3000 \
//! AEROSPIKE_NAMESPACE=test \
//! cargo test --test real_cluster_integration -- --test-threads=1
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::{
    env,
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use kvstate_state::{DeleteRequest, GetRequest, Metadata, SetRequest, StateError, StateStore};
use kvstate_state_aerospike::{AerospikeConnector, AerospikeStore};
use serde_json::{Value, json};

// ============================================================================
// Test Configuration
// ============================================================================

static KEY_COUNTER: AtomicU64 = AtomicU64::new(0);

fn should_run() -> bool {
    env::var("RUN_AEROSPIKE_INTEGRATION_TESTS").is_ok()
}

fn aerospike_hosts() -> String {
    env::var("AEROSPIKE_HOSTS").unwrap_or_else(|_| "127.0.0.1:3000".to_string())
}

fn aerospike_namespace() -> String {
    env::var("AEROSPIKE_NAMESPACE").unwrap_or_else(|_| "test".to_string())
}

/// Returns a key no earlier run has written.
fn unique_key(prefix: &str) -> String {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    format!("{prefix}-{nanos}-{}", KEY_COUNTER.fetch_add(1, Ordering::SeqCst))
}

async fn create_store() -> AerospikeStore {
    let metadata = Metadata::from_pairs([
        ("hosts", aerospike_hosts()),
        ("namespace", aerospike_namespace()),
        ("set", "kvstate_it".to_string()),
    ]);
    AerospikeStore::init(&AerospikeConnector::new(), &metadata)
        .await
        .expect("failed to connect to Aerospike")
}

macro_rules! skip_unless_enabled {
    () => {
        if !should_run() {
            eprintln!("skipping: RUN_AEROSPIKE_INTEGRATION_TESTS not set");
            return;
        }
    };
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_real_ping() {
    skip_unless_enabled!();
    let store = create_store().await;
    store.ping().await.unwrap();
}

#[tokio::test]
async fn test_real_set_get_roundtrip() {
    skip_unless_enabled!();
    let store = create_store().await;
    let key = unique_key("roundtrip");
    let value = json!({"name": "ada", "count": 3, "tags": ["a", "b"]});

    store.set(&SetRequest::new(&key, value.clone())).await.unwrap();
    let resp = store.get(&GetRequest::new(&key)).await.unwrap();

    let read: Value = serde_json::from_slice(resp.data.as_ref().unwrap()).unwrap();
    assert_eq!(read, value);
    assert_eq!(resp.etag.as_deref(), Some("1"));

    store.delete(&DeleteRequest::new(&key)).await.unwrap();
}

#[tokio::test]
async fn test_real_missing_key_is_empty() {
    skip_unless_enabled!();
    let store = create_store().await;

    let resp = store.get(&GetRequest::new(unique_key("missing"))).await.unwrap();

    assert!(resp.is_empty());
}

#[tokio::test]
async fn test_real_stale_etag_is_rejected() {
    skip_unless_enabled!();
    let store = create_store().await;
    let key = unique_key("stale");

    store.set(&SetRequest::new(&key, json!({"v": 1}))).await.unwrap();
    let etag = store.get(&GetRequest::new(&key)).await.unwrap().etag.unwrap();
    store.set(&SetRequest::new(&key, json!({"v": 2})).with_etag(&etag)).await.unwrap();

    let stale = store.set(&SetRequest::new(&key, json!({"v": 3})).with_etag(&etag)).await;
    assert!(matches!(stale, Err(StateError::EtagMismatch { .. })), "got {stale:?}");

    let stale_delete = store.delete(&DeleteRequest::new(&key).with_etag(&etag)).await;
    assert!(matches!(stale_delete, Err(StateError::EtagMismatch { .. })), "got {stale_delete:?}");

    store.delete(&DeleteRequest::new(&key)).await.unwrap();
    assert!(store.get(&GetRequest::new(&key)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_real_delete_absent_key_succeeds() {
    skip_unless_enabled!();
    let store = create_store().await;

    store.delete(&DeleteRequest::new(unique_key("absent"))).await.unwrap();
}
