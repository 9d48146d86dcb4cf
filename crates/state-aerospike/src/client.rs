//! Client seam to the Aerospike cluster.
//!
//! The store never talks to the network itself. It drives a
//! [`ClusterClient`] obtained from a [`Connector`], passing a fresh policy
//! with every call. [`AerospikeConnector`](crate::AerospikeConnector) backs
//! the seam with the `aerospike` driver; tests use the in-memory cluster
//! from the `testutil` feature.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use crate::{
    hosts::Endpoint,
    policy::{ReadPolicy, WritePolicy},
};

/// Default time allowed for the initial cluster connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Named fields of a record: a flat map of dynamically typed values.
pub type Bins = serde_json::Map<String, serde_json::Value>;

/// Address of a record: namespace, set and the caller's key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    /// Namespace holding the record.
    pub namespace: String,
    /// Set (collection) within the namespace. Empty means the default set.
    pub set: String,
    /// The caller-supplied key.
    pub user_key: String,
}

impl Key {
    /// Creates a record key.
    pub fn new(
        namespace: impl Into<String>,
        set: impl Into<String>,
        user_key: impl Into<String>,
    ) -> Self {
        Self { namespace: namespace.into(), set: set.into(), user_key: user_key.into() }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.set, self.user_key)
    }
}

/// A record as returned by a read.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The record's bins.
    pub bins: Bins,
    /// The record's generation, incremented by the cluster on every write.
    pub generation: u32,
}

/// Settings used when opening the cluster connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientPolicy {
    /// Time allowed to establish the initial connection.
    pub timeout: Duration,
    /// Fail the connect call if no seed could be reached.
    pub fail_if_not_connected: bool,
}

impl Default for ClientPolicy {
    fn default() -> Self {
        Self { timeout: DEFAULT_CONNECT_TIMEOUT, fail_if_not_connected: true }
    }
}

/// Errors reported by a cluster client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClientError {
    /// The record does not exist.
    #[error("key not found")]
    KeyNotFound,

    /// The record's generation differs from the policy's expected generation.
    #[error("generation error: record generation does not match expected generation")]
    GenerationMismatch,

    /// The operation exceeded its total timeout.
    #[error("operation timed out after {elapsed:?}")]
    Timeout {
        /// Time spent before giving up.
        elapsed: Duration,
    },

    /// No usable connection to the cluster.
    #[error("connection error: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
    },

    /// The server rejected the operation.
    #[error("server error (result code {code}): {message}")]
    Server {
        /// Aerospike result code.
        code: i32,
        /// Server-supplied message.
        message: String,
    },

    /// The driver rejected an argument before sending the request.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// Any other driver failure.
    #[error("client error: {message}")]
    Driver {
        /// Driver-supplied description.
        message: String,
    },
}

impl ClientError {
    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection { message: message.into() }
    }

    /// Creates a new `Server` error.
    #[must_use]
    pub fn server(code: i32, message: impl Into<String>) -> Self {
        Self::Server { code, message: message.into() }
    }

    /// Creates a new `InvalidArgument` error.
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    /// Creates a new `Driver` error.
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver { message: message.into() }
    }
}

/// Single-record operations against a connected cluster.
///
/// Implementations must be `Send + Sync`: one client is shared by every
/// in-flight operation of a store.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Reads all bins of a record.
    ///
    /// Returns [`ClientError::KeyNotFound`] if the record does not exist.
    async fn get(&self, policy: &ReadPolicy, key: &Key) -> Result<Record, ClientError>;

    /// Writes bins to a record, honoring the policy's generation check.
    async fn put(&self, policy: &WritePolicy, key: &Key, bins: &Bins) -> Result<(), ClientError>;

    /// Deletes a record. Returns whether the record existed.
    async fn delete(&self, policy: &WritePolicy, key: &Key) -> Result<bool, ClientError>;

    /// Returns `true` while at least one cluster node is reachable.
    fn is_connected(&self) -> bool;
}

/// Opens cluster connections.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connects to the cluster through the given seed endpoints.
    async fn connect(
        &self,
        policy: &ClientPolicy,
        hosts: &[Endpoint],
    ) -> Result<Arc<dyn ClusterClient>, ClientError>;
}
