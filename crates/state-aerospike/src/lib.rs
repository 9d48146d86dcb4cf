//! Aerospike-backed state store.
//!
//! Implements [`StateStore`](kvstate_state::StateStore) over an Aerospike
//! cluster, mapping each request onto a single-record operation.
//!
//! # Key Scoping
//!
//! Every caller key is addressed as `(namespace, set, key)`, with the
//! namespace and set fixed when the store is initialized.
//!
//! # Concurrency Model
//!
//! Aerospike keeps a generation counter per record, bumped on every write.
//! The store exposes that counter as the ETag:
//!
//! - **Reads** return the generation as a decimal string
//! - **Conditional writes/deletes** set `EXPECT_GEN_EQUAL` with the parsed ETag
//! - **Unconditional writes/deletes** skip the generation check
//!
//! A lost race surfaces as [`StateError::EtagMismatch`](kvstate_state::StateError::EtagMismatch).
//!
//! # Consistency
//!
//! Strong consistency maps to `COMMIT_ALL` for writes and `CONSISTENCY_ALL`
//! for reads; eventual maps to `COMMIT_MASTER` and `CONSISTENCY_ONE`.
//!
//! # Connecting
//!
//! The store reaches the cluster through the [`Connector`] and
//! [`ClusterClient`] traits. [`AerospikeConnector`] and [`AerospikeClient`]
//! implement them over the `aerospike` driver. With the `testutil` feature,
//! the `mock` module provides an in-memory cluster implementing both.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bins;
mod client;
mod config;
mod error;
mod etag;
mod hosts;
#[cfg(any(test, feature = "testutil"))]
pub mod mock;
mod native;
mod policy;
mod store;

pub use bins::MAX_BIN_NAME_LEN;
pub use client::{
    Bins, ClientError, ClientPolicy, ClusterClient, Connector, DEFAULT_CONNECT_TIMEOUT, Key,
    Record,
};
pub use config::{AerospikeConfig, HOSTS_KEY, NAMESPACE_KEY, SET_KEY};
pub use etag::{MalformedEtag, decode_etag, encode_etag};
pub use hosts::{Endpoint, parse_hosts};
pub use native::{AerospikeClient, AerospikeConnector};
pub use policy::{
    BasePolicy, CommitLevel, ConsistencyLevel, DEFAULT_OPERATION_TIMEOUT, GenerationPolicy,
    ReadPolicy, RecordExistsAction, WritePolicy, read_policy, write_policy,
};
pub use store::AerospikeStore;
