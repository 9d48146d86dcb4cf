//! Shared test utilities for state store testing.
//!
//! Feature-gated behind `testutil`. Enable it in `[dev-dependencies]`:
//!
//! ```toml
//! [dev-dependencies]
//! kvstate-state = { path = "../state", features = ["testutil"] }
//! ```

use crate::error::{StateError, StateResult};

/// Create a deterministic test key from a prefix and index.
///
/// Produces keys like `"prefix:000042"`.
#[must_use]
pub fn make_key(prefix: &str, idx: usize) -> String {
    format!("{prefix}:{idx:06}")
}

/// Assert that a [`StateResult`] is a [`StateError::EtagMismatch`].
#[macro_export]
macro_rules! assert_etag_mismatch {
    ($result:expr) => {
        assert!(
            matches!($result, Err($crate::error::StateError::EtagMismatch { .. })),
            "expected StateError::EtagMismatch, got: {:?}",
            $result,
        );
    };
    ($result:expr, $msg:expr) => {
        assert!(
            matches!($result, Err($crate::error::StateError::EtagMismatch { .. })),
            "{}: expected StateError::EtagMismatch, got: {:?}",
            $msg,
            $result,
        );
    };
}

/// Assert that a [`StateResult`] is `Ok` and return the inner value.
#[macro_export]
macro_rules! assert_state_ok {
    ($result:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("expected Ok, got StateError: {e:?}"),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("{}: expected Ok, got StateError: {e:?}", $msg),
        }
    };
}

/// Helper to verify that a result is an ETag mismatch.
pub fn is_etag_mismatch<T>(result: &StateResult<T>) -> bool {
    matches!(result, Err(StateError::EtagMismatch { .. }))
}

/// Helper to verify that a result is a rejected request.
pub fn is_invalid_request<T>(result: &StateResult<T>) -> bool {
    matches!(result, Err(StateError::InvalidRequest { .. }))
}
