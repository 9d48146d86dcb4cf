//! Request and response types exchanged between a host and a state store.
//!
//! Requests are plain data: the host decodes them from its own wire format
//! (they implement [`serde::Deserialize`]) and hands them to a
//! [`StateStore`](crate::StateStore). ETags are opaque strings to the host;
//! only the store knows how to interpret them.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Consistency requested for a single operation.
///
/// Faster, potentially stale behavior is the default. Correctness-critical
/// calls must opt into [`Consistency::Strong`] per request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consistency {
    /// Acknowledge or read from a single replica.
    ///
    /// Also accepted as `"default"` on the wire.
    #[default]
    #[serde(alias = "default")]
    Eventual,
    /// Involve every replica holding the record.
    Strong,
}

/// Concurrency mode requested for a write or delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Concurrency {
    /// The write must carry an ETag and only succeeds against that version.
    FirstWrite,
    /// The last write wins unless an ETag is supplied.
    #[default]
    LastWrite,
}

/// Per-request options shared by every operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StateOptions {
    /// Requested consistency level.
    pub consistency: Consistency,
    /// Requested concurrency mode. Ignored by reads.
    pub concurrency: Concurrency,
}

impl StateOptions {
    /// Options requesting strong consistency with last-write concurrency.
    #[must_use]
    pub fn strong() -> Self {
        Self { consistency: Consistency::Strong, ..Self::default() }
    }
}

/// Request to read a single key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetRequest {
    /// The key to read.
    pub key: String,
    /// Read options.
    #[serde(default)]
    pub options: StateOptions,
}

impl GetRequest {
    /// Creates a read request with default (eventual) consistency.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), options: StateOptions::default() }
    }

    /// Sets the consistency level for this read.
    #[must_use]
    pub fn with_consistency(mut self, consistency: Consistency) -> Self {
        self.options.consistency = consistency;
        self
    }
}

/// Result of a read.
///
/// A key that was never written (or has been deleted) yields the default
/// response: no data and no ETag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetResponse {
    /// The serialized payload, if the key exists.
    pub data: Option<Bytes>,
    /// The version token of the returned payload, if the key exists.
    pub etag: Option<String>,
}

impl GetResponse {
    /// Returns `true` when the key did not exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_none() && self.etag.is_none()
    }
}

/// Request to store a value under a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetRequest {
    /// The key to write.
    pub key: String,
    /// The structured payload.
    pub value: serde_json::Value,
    /// Version token from a previous read. `None` means unconditional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Write options.
    #[serde(default)]
    pub options: StateOptions,
}

impl SetRequest {
    /// Creates an unconditional write with default options.
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self { key: key.into(), value: value.into(), etag: None, options: StateOptions::default() }
    }

    /// Creates an unconditional write from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns the encoder error if `value` cannot be represented as JSON.
    pub fn from_serializable<T: Serialize>(
        key: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(key, serde_json::to_value(value)?))
    }

    /// Makes the write conditional on `etag`.
    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Replaces the write options.
    #[must_use]
    pub fn with_options(mut self, options: StateOptions) -> Self {
        self.options = options;
        self
    }
}

/// Request to remove a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// The key to delete.
    pub key: String,
    /// Version token from a previous read. `None` means unconditional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Delete options.
    #[serde(default)]
    pub options: StateOptions,
}

impl DeleteRequest {
    /// Creates an unconditional delete with default options.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), etag: None, options: StateOptions::default() }
    }

    /// Makes the delete conditional on `etag`.
    #[must_use]
    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    /// Replaces the delete options.
    #[must_use]
    pub fn with_options(mut self, options: StateOptions) -> Self {
        self.options = options;
        self
    }
}
