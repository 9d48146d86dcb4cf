//! State store error types and result alias.
//!
//! Every state store implementation maps its internal failures onto
//! [`StateError`], so hosts can react to a version conflict or a bad
//! configuration without knowing which backend produced it.
//!
//! # Error Types
//!
//! - [`StateError::MissingConfiguration`] - A required metadata property is absent or empty
//! - [`StateError::InvalidConfiguration`] - A metadata property is present but malformed
//! - [`StateError::InvalidEtag`] - A supplied ETag cannot be decoded by the backend
//! - [`StateError::EtagMismatch`] - The stored version differs from the supplied ETag
//! - [`StateError::InvalidRequest`] - The request options violate the state contract
//! - [`StateError::Serialization`] - The payload cannot be encoded or decoded
//! - [`StateError::Connection`] - The backend could not be reached during initialization
//! - [`StateError::Backend`] - Any other failure reported by the backend client
//!
//! A read of a key that was never written is *not* an error: it yields an
//! empty [`GetResponse`](crate::GetResponse).
//!
//! # Example
//!
//! ```
//! use kvstate_state::{StateError, StateResult};
//!
//! fn require_namespace(value: &str) -> StateResult<&str> {
//!     if value.is_empty() {
//!         return Err(StateError::missing_configuration("namespace"));
//!     }
//!     Ok(value)
//! }
//!
//! assert!(require_namespace("").is_err());
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for state store operations.
pub type StateResult<T> = Result<T, StateError>;

/// Errors that can occur while configuring or operating a state store.
///
/// # Non-exhaustive
///
/// New variants may be added in minor releases. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StateError {
    /// A required configuration property is absent or empty.
    ///
    /// The same kind is used for every required property; `field` names the
    /// one that was missing.
    #[error("value for '{field}' missing")]
    MissingConfiguration {
        /// The metadata property that was missing.
        field: &'static str,
    },

    /// A configuration property is present but cannot be parsed.
    #[error("invalid value for {field}: {message}")]
    InvalidConfiguration {
        /// The metadata property that failed validation.
        field: &'static str,
        /// Description of what was wrong with the value.
        message: String,
    },

    /// The supplied ETag is not a valid version token for this backend.
    #[error("failed to {operation} key {key}: invalid ETag value '{etag}'")]
    InvalidEtag {
        /// The operation that received the ETag (`set`, `delete`).
        operation: &'static str,
        /// The key named in the request.
        key: String,
        /// The ETag as supplied by the caller.
        etag: String,
        /// Why the backend could not decode the ETag.
        #[source]
        source: Option<BoxError>,
    },

    /// The record's current version does not match the supplied ETag.
    ///
    /// The write or delete was not applied. Callers should re-read the key
    /// to obtain the current ETag before retrying.
    #[error("failed to {operation} key {key}: etag mismatch, the stored version has changed")]
    EtagMismatch {
        /// The conditional operation that was refused (`set`, `delete`).
        operation: &'static str,
        /// The key whose version check failed.
        key: String,
    },

    /// The request's option combination is rejected by the state contract.
    #[error("failed to {operation} key {key}: invalid request: {message}")]
    InvalidRequest {
        /// The operation that was rejected.
        operation: &'static str,
        /// The key named in the rejected request.
        key: String,
        /// Which rule the request violated.
        message: String,
    },

    /// The payload could not be encoded for storage or decoded after a read.
    #[error("failed to {operation} key {key}: serialization error: {message}")]
    Serialization {
        /// The operation whose payload failed to (de)serialize.
        operation: &'static str,
        /// The key whose payload failed to (de)serialize.
        key: String,
        /// Description of the serialization failure.
        message: String,
        /// The underlying encoder error.
        #[source]
        source: Option<BoxError>,
    },

    /// The backend could not be reached while initializing the store.
    #[error("{message}")]
    Connection {
        /// Description naming the subsystem that failed to connect.
        message: String,
        /// The underlying client error.
        #[source]
        source: Option<BoxError>,
    },

    /// Any other failure reported by the backend client.
    #[error("failed to {operation} key {key}: {source}")]
    Backend {
        /// The operation that failed (`get`, `set`, `delete`).
        operation: &'static str,
        /// The key the operation targeted.
        key: String,
        /// The underlying client error.
        #[source]
        source: BoxError,
    },
}

impl StateError {
    /// Creates a new `MissingConfiguration` error for the given property.
    #[must_use]
    pub fn missing_configuration(field: &'static str) -> Self {
        Self::MissingConfiguration { field }
    }

    /// Creates a new `InvalidConfiguration` error for the given property.
    #[must_use]
    pub fn invalid_configuration(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidConfiguration { field, message: message.into() }
    }

    /// Creates a new `InvalidEtag` error for a token the backend refused.
    #[must_use]
    pub fn invalid_etag(
        operation: &'static str,
        key: impl Into<String>,
        etag: impl Into<String>,
    ) -> Self {
        Self::InvalidEtag { operation, key: key.into(), etag: etag.into(), source: None }
    }

    /// Creates a new `InvalidEtag` error carrying the decoder's failure.
    #[must_use]
    pub fn invalid_etag_with_source(
        operation: &'static str,
        key: impl Into<String>,
        etag: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidEtag {
            operation,
            key: key.into(),
            etag: etag.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Creates a new `EtagMismatch` error for a refused conditional operation.
    #[must_use]
    pub fn etag_mismatch(operation: &'static str, key: impl Into<String>) -> Self {
        Self::EtagMismatch { operation, key: key.into() }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(
        operation: &'static str,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidRequest { operation, key: key.into(), message: message.into() }
    }

    /// Creates a new `Serialization` error with a message and source error.
    #[must_use]
    pub fn serialization_with_source(
        operation: &'static str,
        key: impl Into<String>,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Serialization {
            operation,
            key: key.into(),
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    /// Creates a new `Serialization` error with the given message.
    #[must_use]
    pub fn serialization(
        operation: &'static str,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Serialization { operation, key: key.into(), message: message.into(), source: None }
    }

    /// Returns the operation this error is attributed to, if any.
    ///
    /// Configuration and connection errors happen before any operation and
    /// return `None`.
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::InvalidEtag { operation, .. }
            | Self::EtagMismatch { operation, .. }
            | Self::InvalidRequest { operation, .. }
            | Self::Serialization { operation, .. }
            | Self::Backend { operation, .. } => Some(*operation),
            Self::MissingConfiguration { .. }
            | Self::InvalidConfiguration { .. }
            | Self::Connection { .. } => None,
        }
    }

    /// Returns the key this error is attributed to, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::InvalidEtag { key, .. }
            | Self::EtagMismatch { key, .. }
            | Self::InvalidRequest { key, .. }
            | Self::Serialization { key, .. }
            | Self::Backend { key, .. } => Some(key.as_str()),
            Self::MissingConfiguration { .. }
            | Self::InvalidConfiguration { .. }
            | Self::Connection { .. } => None,
        }
    }

    /// Creates a new `Connection` error with a message and source error.
    #[must_use]
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `Backend` error for a failed operation on `key`.
    #[must_use]
    pub fn backend(
        operation: &'static str,
        key: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Backend { operation, key: key.into(), source: Arc::new(source) }
    }

    /// Returns `true` for errors caused by the caller's ETag.
    ///
    /// Hosts typically surface these as `400`/`409` responses rather than
    /// internal failures.
    #[must_use]
    pub fn is_etag_error(&self) -> bool {
        matches!(self, Self::InvalidEtag { .. } | Self::EtagMismatch { .. })
    }

    /// Returns `true` for errors detected from configuration alone, before
    /// any connection was attempted.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::MissingConfiguration { .. } | Self::InvalidConfiguration { .. })
    }
}
