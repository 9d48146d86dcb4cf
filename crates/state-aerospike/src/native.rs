//! Cluster client backed by the `aerospike` driver.
//!
//! The driver's API is blocking, so every call runs on tokio's blocking
//! pool. Seam policies are translated into the driver's policy types per
//! call, with driver-side retries disabled: a failed operation is reported
//! once and never replayed.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use aerospike::{Bin, ErrorKind, ResultCode, Value};
use async_trait::async_trait;
use serde_json::Value as Json;

use crate::{
    client::{Bins, ClientError, ClientPolicy, ClusterClient, Connector, Key, Record},
    hosts::Endpoint,
    policy::{
        CommitLevel, ConsistencyLevel, GenerationPolicy, ReadPolicy, RecordExistsAction,
        WritePolicy,
    },
};

/// [`Connector`] that opens connections with the `aerospike` driver.
///
/// # Example
///
/// ```no_run
/// use kvstate_state_aerospike::{AerospikeConfig, AerospikeConnector, AerospikeStore, Endpoint};
///
/// # async fn example() -> kvstate_state::StateResult<()> {
/// let config = AerospikeConfig::builder()
///     .hosts(vec![Endpoint::new("127.0.0.1", 3000)])
///     .namespace("test")
///     .build()?;
/// let store = AerospikeStore::connect(&AerospikeConnector::new(), &config).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AerospikeConnector;

impl AerospikeConnector {
    /// Creates a connector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for AerospikeConnector {
    async fn connect(
        &self,
        policy: &ClientPolicy,
        hosts: &[Endpoint],
    ) -> Result<Arc<dyn ClusterClient>, ClientError> {
        let client_policy = to_client_policy(policy);
        let seeds: Vec<aerospike::Host> =
            hosts.iter().map(|h| aerospike::Host::new(&h.host, h.port)).collect();

        let started = Instant::now();
        let client = run_blocking(started, move || {
            aerospike::Client::new(&client_policy, &seeds)
                .map_err(|e| driver_error_to_client_error(&e, started.elapsed()))
        })
        .await?;

        Ok(Arc::new(AerospikeClient::new(client)))
    }
}

/// [`ClusterClient`] over a connected [`aerospike::Client`].
///
/// Clones share the underlying driver client.
#[derive(Clone)]
pub struct AerospikeClient {
    client: Arc<aerospike::Client>,
}

impl std::fmt::Debug for AerospikeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AerospikeClient").finish_non_exhaustive()
    }
}

impl AerospikeClient {
    /// Wraps an already connected driver client.
    #[must_use]
    pub fn new(client: aerospike::Client) -> Self {
        Self { client: Arc::new(client) }
    }

    /// Returns the driver client.
    #[must_use]
    pub fn inner(&self) -> &aerospike::Client {
        &self.client
    }
}

#[async_trait]
impl ClusterClient for AerospikeClient {
    async fn get(&self, policy: &ReadPolicy, key: &Key) -> Result<Record, ClientError> {
        let read_policy = to_read_policy(policy);
        let key = to_driver_key(key)?;
        let client = Arc::clone(&self.client);

        let started = Instant::now();
        run_blocking(started, move || {
            client
                .get(&read_policy, &key, aerospike::Bins::All)
                .map(|record| Record {
                    bins: bins_from_driver(&record.bins),
                    generation: record.generation,
                })
                .map_err(|e| driver_error_to_client_error(&e, started.elapsed()))
        })
        .await
    }

    async fn put(&self, policy: &WritePolicy, key: &Key, bins: &Bins) -> Result<(), ClientError> {
        let write_policy = to_write_policy(policy);
        let key = to_driver_key(key)?;
        let values = bins_to_driver(bins);
        let client = Arc::clone(&self.client);

        let started = Instant::now();
        run_blocking(started, move || {
            let bins: Vec<Bin<'_>> =
                values.iter().map(|(name, value)| Bin::new(name.as_str(), value.clone())).collect();
            client
                .put(&write_policy, &key, &bins)
                .map_err(|e| driver_error_to_client_error(&e, started.elapsed()))
        })
        .await
    }

    async fn delete(&self, policy: &WritePolicy, key: &Key) -> Result<bool, ClientError> {
        let write_policy = to_write_policy(policy);
        let key = to_driver_key(key)?;
        let client = Arc::clone(&self.client);

        let started = Instant::now();
        run_blocking(started, move || {
            client
                .delete(&write_policy, &key)
                .map_err(|e| driver_error_to_client_error(&e, started.elapsed()))
        })
        .await
    }

    fn is_connected(&self) -> bool {
        self.client.is_connected()
    }
}

/// Runs a blocking driver call on the blocking pool.
async fn run_blocking<T, F>(started: Instant, f: F) -> Result<T, ClientError>
where
    F: FnOnce() -> Result<T, ClientError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, elapsed_ms = elapsed_ms(started), "driver call aborted");
            Err(ClientError::driver(format!("driver call aborted: {e}")))
        },
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Policy translation
// ============================================================================

fn to_client_policy(policy: &ClientPolicy) -> aerospike::ClientPolicy {
    aerospike::ClientPolicy {
        timeout: Some(policy.timeout),
        fail_if_not_connected: policy.fail_if_not_connected,
        ..aerospike::ClientPolicy::default()
    }
}

fn to_read_policy(policy: &ReadPolicy) -> aerospike::ReadPolicy {
    aerospike::ReadPolicy {
        consistency_level: match policy.consistency_level {
            ConsistencyLevel::ConsistencyOne => aerospike::ConsistencyLevel::ConsistencyOne,
            ConsistencyLevel::ConsistencyAll => aerospike::ConsistencyLevel::ConsistencyAll,
        },
        timeout: Some(policy.total_timeout),
        max_retries: None,
        ..aerospike::ReadPolicy::default()
    }
}

fn to_write_policy(policy: &WritePolicy) -> aerospike::WritePolicy {
    aerospike::WritePolicy {
        base_policy: to_read_policy(&policy.base_policy),
        generation_policy: match policy.generation_policy {
            GenerationPolicy::None => aerospike::GenerationPolicy::None,
            GenerationPolicy::ExpectGenEqual => aerospike::GenerationPolicy::ExpectGenEqual,
        },
        generation: policy.generation,
        commit_level: match policy.commit_level {
            CommitLevel::CommitAll => aerospike::CommitLevel::CommitAll,
            CommitLevel::CommitMaster => aerospike::CommitLevel::CommitMaster,
        },
        record_exists_action: match policy.record_exists_action {
            RecordExistsAction::Update => aerospike::RecordExistsAction::Update,
            RecordExistsAction::Replace => aerospike::RecordExistsAction::Replace,
        },
        ..aerospike::WritePolicy::default()
    }
}

fn to_driver_key(key: &Key) -> Result<aerospike::Key, ClientError> {
    aerospike::Key::new(key.namespace.clone(), key.set.clone(), Value::from(key.user_key.as_str()))
        .map_err(|e| ClientError::invalid_argument(format!("invalid key {key}: {e}")))
}

// ============================================================================
// Error mapping
// ============================================================================

/// Classifies a driver error.
///
/// `KeyNotFoundError` and `GenerationError` keep their dedicated variants so
/// the store can tell an absent record and a lost race from other failures.
fn driver_error_to_client_error(err: &aerospike::Error, elapsed: Duration) -> ClientError {
    match err.kind() {
        ErrorKind::ServerError(ResultCode::KeyNotFoundError) => ClientError::KeyNotFound,
        ErrorKind::ServerError(ResultCode::GenerationError) => ClientError::GenerationMismatch,
        ErrorKind::ServerError(ResultCode::Timeout) => ClientError::Timeout { elapsed },
        ErrorKind::Connection(message) => ClientError::connection(message.clone()),
        ErrorKind::NoMoreConnections | ErrorKind::Io(_) => ClientError::connection(err.to_string()),
        ErrorKind::InvalidArgument(message) => ClientError::invalid_argument(message.clone()),
        _ => ClientError::driver(err.to_string()),
    }
}

// ============================================================================
// Value conversion
// ============================================================================

fn bins_to_driver(bins: &Bins) -> Vec<(String, Value)> {
    bins.iter().map(|(name, value)| (name.clone(), json_to_value(value))).collect()
}

fn bins_from_driver(bins: &HashMap<String, Value>) -> Bins {
    bins.iter().map(|(name, value)| (name.clone(), value_to_json(value))).collect()
}

fn json_to_value(value: &Json) -> Value {
    match value {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(i), _) => Value::Int(i),
            (None, Some(u)) => Value::UInt(u),
            (None, None) => Value::from(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(items.iter().map(json_to_value).collect()),
        Json::Object(fields) => Value::HashMap(
            fields.iter().map(|(k, v)| (Value::String(k.clone()), json_to_value(v))).collect(),
        ),
    }
}

/// Maps a driver value back to JSON.
///
/// Blobs become arrays of bytes and map keys that are not strings are
/// rendered with their display form. Values JSON cannot hold (non-finite
/// floats) read back as `null`.
fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Nil => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::from(*i),
        Value::UInt(u) => Json::from(*u),
        Value::Float(f) => {
            serde_json::Number::from_f64(f64::from(f.clone())).map_or(Json::Null, Json::Number)
        },
        Value::String(s) => Json::String(s.clone()),
        Value::Blob(bytes) => Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::HashMap(map) => {
            Json::Object(map.iter().map(|(k, v)| (map_key(k), value_to_json(v))).collect())
        },
        Value::OrderedMap(entries) => {
            Json::Object(entries.iter().map(|(k, v)| (map_key(k), value_to_json(v))).collect())
        },
        other => Json::String(other.to_string()),
    }
}

fn map_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
