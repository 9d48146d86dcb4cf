//! Aerospike-backed state store implementation.
//!
//! This module provides [`AerospikeStore`], which implements the
//! [`StateStore`] trait on top of a [`ClusterClient`].

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use kvstate_state::{
    DeleteRequest, GetRequest, GetResponse, Metadata, SetRequest, StateError, StateResult,
    StateStore, check_delete_request_options, check_set_request_options,
};

use crate::{
    bins::{from_bins, to_bins},
    client::{ClientError, ClusterClient, Connector, Key},
    config::AerospikeConfig,
    error::{client_error_to_state_error, connect_error},
    etag::encode_etag,
    policy::{DEFAULT_OPERATION_TIMEOUT, ReadPolicy, WritePolicy, read_policy, write_policy},
};

/// Aerospike-backed implementation of [`StateStore`].
///
/// Each store owns its connection context: the cluster client plus the
/// namespace and set every key is scoped to. The context is fixed at
/// construction; reconfiguring means building a new store.
///
/// # ETags
///
/// The ETag of a record is its generation counter in decimal. Supplying it
/// on a write or delete turns the operation into a compare-and-swap against
/// that generation.
///
/// # Thread Safety
///
/// `AerospikeStore` is `Send + Sync` and cheaply cloneable; clones share the
/// client. The store holds no locks: concurrent writers to one key are
/// serialized by the cluster's generation check.
///
/// # Example
///
/// ```no_run
/// use kvstate_state::{GetRequest, Metadata, SetRequest, StateStore};
/// use kvstate_state_aerospike::{AerospikeConnector, AerospikeStore};
/// use serde_json::json;
///
/// # async fn example() -> kvstate_state::StateResult<()> {
/// let metadata = Metadata::from_pairs([("hosts", "127.0.0.1:3000"), ("namespace", "test")]);
/// let store = AerospikeStore::init(&AerospikeConnector::new(), &metadata).await?;
///
/// store.set(&SetRequest::new("a", json!({"x": 1}))).await?;
/// let resp = store.get(&GetRequest::new("a")).await?;
/// println!("etag: {:?}", resp.etag);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AerospikeStore {
    /// The connected cluster client.
    client: Arc<dyn ClusterClient>,

    /// Namespace for all operations.
    namespace: String,

    /// Set for all operations; empty selects the default set.
    set: String,

    /// Total timeout stamped onto every operation policy.
    operation_timeout: Duration,
}

impl std::fmt::Debug for AerospikeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AerospikeStore")
            .field("namespace", &self.namespace)
            .field("set", &self.set)
            .field("operation_timeout", &self.operation_timeout)
            .finish_non_exhaustive()
    }
}

impl AerospikeStore {
    /// Initializes a store from host-supplied metadata.
    ///
    /// Validates `hosts`, `namespace` and `set`, then connects through
    /// `connector`. Nothing is retained if any step fails.
    ///
    /// # Errors
    ///
    /// - [`StateError::MissingConfiguration`] / [`StateError::InvalidConfiguration`] for bad metadata,
    ///   before any connection attempt
    /// - [`StateError::Connection`] if the cluster cannot be reached
    pub async fn init<C>(connector: &C, metadata: &Metadata) -> StateResult<Self>
    where
        C: Connector + ?Sized,
    {
        let config = AerospikeConfig::from_metadata(metadata)?;
        Self::connect(connector, &config).await
    }

    /// Connects to the cluster described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Connection`] if the cluster cannot be reached.
    pub async fn connect<C>(connector: &C, config: &AerospikeConfig) -> StateResult<Self>
    where
        C: Connector + ?Sized,
    {
        let client =
            connector.connect(&config.client_policy(), config.hosts()).await.map_err(connect_error)?;

        tracing::info!(
            hosts = config.hosts().len(),
            namespace = config.namespace(),
            set = config.set(),
            "connected to Aerospike cluster"
        );

        Ok(Self {
            client,
            namespace: config.namespace().to_owned(),
            set: config.set().to_owned(),
            operation_timeout: config.operation_timeout(),
        })
    }

    /// Creates a store over an existing client.
    ///
    /// Useful when several stores share one cluster connection.
    #[must_use]
    pub fn from_client(
        client: Arc<dyn ClusterClient>,
        namespace: impl Into<String>,
        set: impl Into<String>,
    ) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            set: set.into(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the set name.
    #[must_use]
    pub fn set_name(&self) -> &str {
        &self.set
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &dyn ClusterClient {
        self.client.as_ref()
    }

    fn record_key(&self, user_key: &str) -> Key {
        Key::new(self.namespace.as_str(), self.set.as_str(), user_key)
    }

    fn read_policy_for(&self, req: &GetRequest) -> ReadPolicy {
        ReadPolicy { total_timeout: self.operation_timeout, ..read_policy(req.options.consistency) }
    }

    fn stamp_timeout(&self, mut policy: WritePolicy) -> WritePolicy {
        policy.base_policy.total_timeout = self.operation_timeout;
        policy
    }
}

#[async_trait]
impl StateStore for AerospikeStore {
    #[tracing::instrument(skip(self, req), fields(key = %req.key))]
    async fn get(&self, req: &GetRequest) -> StateResult<GetResponse> {
        let key = self.record_key(&req.key);
        let policy = self.read_policy_for(req);

        match self.client.get(&policy, &key).await {
            Ok(record) => Ok(GetResponse {
                data: Some(from_bins(&req.key, &record.bins)?),
                etag: Some(encode_etag(record.generation)),
            }),
            Err(ClientError::KeyNotFound) => {
                tracing::debug!("key not found");
                Ok(GetResponse::default())
            },
            Err(e) => Err(client_error_to_state_error("get", &req.key, e)),
        }
    }

    #[tracing::instrument(skip(self, req), fields(key = %req.key))]
    async fn set(&self, req: &SetRequest) -> StateResult<()> {
        check_set_request_options(req)?;

        let policy = write_policy("set", &req.key, req.etag.as_deref(), req.options.consistency)?;
        let policy = self.stamp_timeout(policy);
        let bins = to_bins(&req.key, &req.value)?;
        let key = self.record_key(&req.key);

        self.client
            .put(&policy, &key, &bins)
            .await
            .map_err(|e| client_error_to_state_error("set", &req.key, e))
    }

    #[tracing::instrument(skip(self, req), fields(key = %req.key))]
    async fn delete(&self, req: &DeleteRequest) -> StateResult<()> {
        check_delete_request_options(req)?;

        let policy =
            write_policy("delete", &req.key, req.etag.as_deref(), req.options.consistency)?;
        let policy = self.stamp_timeout(policy);
        let key = self.record_key(&req.key);

        let existed = self
            .client
            .delete(&policy, &key)
            .await
            .map_err(|e| client_error_to_state_error("delete", &req.key, e))?;

        if !existed {
            tracing::debug!("delete of absent key");
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn ping(&self) -> StateResult<()> {
        if self.client.is_connected() {
            return Ok(());
        }
        Err(StateError::Connection {
            message: format!("aerospike: no connected nodes for namespace {}", self.namespace),
            source: None,
        })
    }
}
