//! In-memory cluster for tests.
//!
//! [`MockCluster`] implements both [`Connector`] and [`ClusterClient`] over a
//! shared record map, reproducing the cluster behavior the store relies on:
//! per-record generations, generation-checked writes and deletes, and "key
//! not found" on reads of absent records. It also records the policies it
//! receives and can be told to fail upcoming calls.
//!
//! Clones share state, so a test can keep a handle to inspect the records a
//! store wrote through its own clone.
//!
//! Available with the `testutil` feature.

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::{
    client::{Bins, ClientError, ClientPolicy, ClusterClient, Connector, Key, Record},
    hosts::Endpoint,
    policy::{GenerationPolicy, ReadPolicy, RecordExistsAction, WritePolicy},
};

#[derive(Debug, Default)]
struct Inner {
    records: RwLock<HashMap<Key, Record>>,
    failures: Mutex<VecDeque<ClientError>>,
    connect_error: Mutex<Option<ClientError>>,
    connected_hosts: Mutex<Vec<Endpoint>>,
    disconnected: RwLock<bool>,
    last_read_policy: Mutex<Option<ReadPolicy>>,
    last_write_policy: Mutex<Option<WritePolicy>>,
    writes: Mutex<usize>,
}

/// Shared in-memory stand-in for an Aerospike cluster.
#[derive(Debug, Clone, Default)]
pub struct MockCluster {
    inner: Arc<Inner>,
}

impl MockCluster {
    /// Creates an empty cluster that accepts connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent [`Connector::connect`] call fail with `err`.
    pub fn refuse_connections(&self, err: ClientError) {
        *self.inner.connect_error.lock() = Some(err);
    }

    /// Queues `err` to be returned by the next client operation.
    ///
    /// Queued failures are consumed in order, one per operation.
    pub fn fail_next(&self, err: ClientError) {
        self.inner.failures.lock().push_back(err);
    }

    /// Marks every node unreachable; [`ClusterClient::is_connected`] turns false.
    pub fn disconnect(&self) {
        *self.inner.disconnected.write() = true;
    }

    /// Returns a copy of the stored record, if any.
    #[must_use]
    pub fn record(&self, key: &Key) -> Option<Record> {
        self.inner.records.read().get(key).cloned()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.records.read().len()
    }

    /// Returns `true` if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.records.read().is_empty()
    }

    /// Returns the endpoints passed to the most recent successful connect.
    #[must_use]
    pub fn connected_hosts(&self) -> Vec<Endpoint> {
        self.inner.connected_hosts.lock().clone()
    }

    /// Returns the policy of the most recent read.
    #[must_use]
    pub fn last_read_policy(&self) -> Option<ReadPolicy> {
        *self.inner.last_read_policy.lock()
    }

    /// Returns the policy of the most recent put or delete.
    #[must_use]
    pub fn last_write_policy(&self) -> Option<WritePolicy> {
        *self.inner.last_write_policy.lock()
    }

    /// Returns how many puts and deletes reached the cluster.
    #[must_use]
    pub fn write_count(&self) -> usize {
        *self.inner.writes.lock()
    }

    fn take_failure(&self) -> Result<(), ClientError> {
        match self.inner.failures.lock().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record_write(&self, policy: &WritePolicy) {
        *self.inner.last_write_policy.lock() = Some(*policy);
        *self.inner.writes.lock() += 1;
    }
}

fn check_generation(policy: &WritePolicy, current: Option<&Record>) -> Result<(), ClientError> {
    match (policy.generation_policy, current) {
        (GenerationPolicy::ExpectGenEqual, Some(record)) if record.generation != policy.generation => {
            Err(ClientError::GenerationMismatch)
        },
        _ => Ok(()),
    }
}

#[async_trait]
impl ClusterClient for MockCluster {
    async fn get(&self, policy: &ReadPolicy, key: &Key) -> Result<Record, ClientError> {
        *self.inner.last_read_policy.lock() = Some(*policy);
        self.take_failure()?;

        self.inner.records.read().get(key).cloned().ok_or(ClientError::KeyNotFound)
    }

    async fn put(&self, policy: &WritePolicy, key: &Key, bins: &Bins) -> Result<(), ClientError> {
        self.record_write(policy);
        self.take_failure()?;

        let mut records = self.inner.records.write();
        let current = records.get(key);
        check_generation(policy, current)?;

        let record = match current {
            Some(existing) => {
                let bins = match policy.record_exists_action {
                    RecordExistsAction::Replace => bins.clone(),
                    RecordExistsAction::Update => {
                        let mut merged = existing.bins.clone();
                        merged.extend(bins.iter().map(|(k, v)| (k.clone(), v.clone())));
                        merged
                    },
                };
                let generation = match existing.generation.wrapping_add(1) {
                    0 => 1,
                    next => next,
                };
                Record { bins, generation }
            },
            None => Record { bins: bins.clone(), generation: 1 },
        };

        records.insert(key.clone(), record);
        Ok(())
    }

    async fn delete(&self, policy: &WritePolicy, key: &Key) -> Result<bool, ClientError> {
        self.record_write(policy);
        self.take_failure()?;

        let mut records = self.inner.records.write();
        check_generation(policy, records.get(key))?;

        Ok(records.remove(key).is_some())
    }

    fn is_connected(&self) -> bool {
        !*self.inner.disconnected.read()
    }
}

#[async_trait]
impl Connector for MockCluster {
    async fn connect(
        &self,
        _policy: &ClientPolicy,
        hosts: &[Endpoint],
    ) -> Result<Arc<dyn ClusterClient>, ClientError> {
        if let Some(err) = self.inner.connect_error.lock().clone() {
            return Err(err);
        }
        if hosts.is_empty() {
            return Err(ClientError::connection("no seed hosts"));
        }

        *self.inner.connected_hosts.lock() = hosts.to_vec();
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use kvstate_state::Consistency;
    use serde_json::json;

    use super::*;
    use crate::policy::write_policy;

    fn key(user_key: &str) -> Key {
        Key::new("test", "", user_key)
    }

    fn bins(value: serde_json::Value) -> Bins {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn unconditional() -> WritePolicy {
        write_policy("set", "k", None, Consistency::Eventual).unwrap()
    }

    fn expecting(generation: u32) -> WritePolicy {
        let etag = generation.to_string();
        write_policy("set", "k", Some(&etag), Consistency::Eventual).unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_is_key_not_found() {
        let cluster = MockCluster::new();
        let result = cluster.get(&ReadPolicy::default(), &key("a")).await;
        assert_eq!(result, Err(ClientError::KeyNotFound));
    }

    #[tokio::test]
    async fn test_generation_starts_at_one_and_increments() {
        let cluster = MockCluster::new();

        cluster.put(&unconditional(), &key("a"), &bins(json!({"x": 1}))).await.unwrap();
        assert_eq!(cluster.record(&key("a")).unwrap().generation, 1);

        cluster.put(&unconditional(), &key("a"), &bins(json!({"x": 2}))).await.unwrap();
        assert_eq!(cluster.record(&key("a")).unwrap().generation, 2);
    }

    #[tokio::test]
    async fn test_generation_check_on_put() {
        let cluster = MockCluster::new();
        cluster.put(&unconditional(), &key("a"), &bins(json!({"x": 1}))).await.unwrap();

        let stale = cluster.put(&expecting(7), &key("a"), &bins(json!({"x": 2}))).await;
        assert_eq!(stale, Err(ClientError::GenerationMismatch));
        assert_eq!(cluster.record(&key("a")).unwrap().bins, bins(json!({"x": 1})));

        cluster.put(&expecting(1), &key("a"), &bins(json!({"x": 2}))).await.unwrap();
        assert_eq!(cluster.record(&key("a")).unwrap().generation, 2);
    }

    #[tokio::test]
    async fn test_replace_drops_unlisted_bins() {
        let cluster = MockCluster::new();
        cluster.put(&unconditional(), &key("a"), &bins(json!({"x": 1, "y": 2}))).await.unwrap();
        cluster.put(&unconditional(), &key("a"), &bins(json!({"x": 3}))).await.unwrap();

        assert_eq!(cluster.record(&key("a")).unwrap().bins, bins(json!({"x": 3})));
    }

    #[tokio::test]
    async fn test_update_merges_bins() {
        let cluster = MockCluster::new();
        let policy =
            WritePolicy { record_exists_action: RecordExistsAction::Update, ..unconditional() };
        cluster.put(&policy, &key("a"), &bins(json!({"x": 1, "y": 2}))).await.unwrap();
        cluster.put(&policy, &key("a"), &bins(json!({"x": 3}))).await.unwrap();

        assert_eq!(cluster.record(&key("a")).unwrap().bins, bins(json!({"x": 3, "y": 2})));
    }

    #[tokio::test]
    async fn test_delete_reports_existence_and_checks_generation() {
        let cluster = MockCluster::new();
        assert!(!cluster.delete(&unconditional(), &key("a")).await.unwrap());

        cluster.put(&unconditional(), &key("a"), &bins(json!({}))).await.unwrap();
        assert_eq!(
            cluster.delete(&expecting(5), &key("a")).await,
            Err(ClientError::GenerationMismatch)
        );
        assert!(cluster.delete(&expecting(1), &key("a")).await.unwrap());
        assert!(cluster.is_empty());
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed_in_order() {
        let cluster = MockCluster::new();
        cluster.fail_next(ClientError::server(1, "first"));
        cluster.fail_next(ClientError::server(2, "second"));

        let first = cluster.get(&ReadPolicy::default(), &key("a")).await;
        let second = cluster.put(&unconditional(), &key("a"), &bins(json!({}))).await;
        let third = cluster.put(&unconditional(), &key("a"), &bins(json!({}))).await;

        assert_eq!(first, Err(ClientError::server(1, "first")));
        assert_eq!(second, Err(ClientError::server(2, "second")));
        assert!(third.is_ok());
        assert_eq!(cluster.len(), 1);
    }

    #[tokio::test]
    async fn test_connect_records_hosts_and_can_refuse() {
        let cluster = MockCluster::new();
        let hosts = vec![Endpoint::new("a", 3000), Endpoint::new("b", 3001)];

        let client = cluster.connect(&ClientPolicy::default(), &hosts).await.unwrap();
        assert!(client.is_connected());
        assert_eq!(cluster.connected_hosts(), hosts);

        cluster.refuse_connections(ClientError::connection("refused"));
        let result = cluster.connect(&ClientPolicy::default(), &hosts).await;
        assert!(matches!(result, Err(ClientError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let cluster = MockCluster::new();
        let client = cluster.connect(&ClientPolicy::default(), &[Endpoint::new("a", 3000)]).await.unwrap();

        client.put(&unconditional(), &key("a"), &bins(json!({"x": 1}))).await.unwrap();

        assert!(cluster.record(&key("a")).is_some());
    }
}
