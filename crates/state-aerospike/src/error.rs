//! Mapping from client errors to the canonical [`StateError`].

use kvstate_state::StateError;

use crate::client::ClientError;

/// Converts a client error raised by `operation` on `key` into a state error.
///
/// A generation mismatch becomes [`StateError::EtagMismatch`] so callers can
/// tell a lost race from an infrastructure failure. Everything else is
/// wrapped as [`StateError::Backend`] with the operation and key attached.
/// "Key not found" on reads never reaches this function; the executor turns
/// it into an empty response first.
pub(crate) fn client_error_to_state_error(
    operation: &'static str,
    key: &str,
    err: ClientError,
) -> StateError {
    match err {
        ClientError::GenerationMismatch => {
            tracing::debug!(operation, key, "generation check failed");
            StateError::etag_mismatch(operation, key)
        },
        ClientError::Timeout { elapsed } => {
            let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
            tracing::warn!(operation, key, elapsed_ms, "Aerospike operation timed out");
            StateError::backend(operation, key, err)
        },
        other => StateError::backend(operation, key, other),
    }
}

/// Wraps a failed cluster connection.
pub(crate) fn connect_error(err: ClientError) -> StateError {
    tracing::error!(error = %err, "failed to connect to Aerospike cluster");
    StateError::connection_with_source(format!("aerospike: failed to connect: {err}"), err)
}
