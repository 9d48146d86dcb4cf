//! Payload <-> bin map encoding.
//!
//! A payload is stored as one bin per top-level JSON field. Only JSON
//! objects can be flattened this way; nested values are kept as
//! dynamically typed bin values. Reads re-encode the bin map as JSON bytes.

use bytes::Bytes;
use kvstate_state::{StateError, StateResult};
use serde_json::Value;

use crate::client::Bins;

/// Longest bin name the cluster accepts.
pub const MAX_BIN_NAME_LEN: usize = 15;

/// Flattens a payload into a bin map.
///
/// # Errors
///
/// Returns [`StateError::Serialization`] if the payload is not a JSON object
/// or a field name exceeds [`MAX_BIN_NAME_LEN`] bytes.
pub(crate) fn to_bins(key: &str, value: &Value) -> StateResult<Bins> {
    let Value::Object(fields) = value else {
        return Err(StateError::serialization(
            "set",
            key,
            format!("value must be a JSON object to be stored as bins, got {}", kind(value)),
        ));
    };

    if let Some(name) = fields.keys().find(|name| name.len() > MAX_BIN_NAME_LEN) {
        return Err(StateError::serialization(
            "set",
            key,
            format!("field name '{name}' exceeds the {MAX_BIN_NAME_LEN}-byte bin name limit"),
        ));
    }

    Ok(fields.clone())
}

/// Encodes a record's bins as the JSON payload returned to callers.
pub(crate) fn from_bins(key: &str, bins: &Bins) -> StateResult<Bytes> {
    serde_json::to_vec(bins).map(Bytes::from).map_err(|e| {
        StateError::serialization_with_source(
            "get",
            key,
            "failed to encode record bins as JSON",
            e,
        )
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
