//! Request option rules shared by every state store.
//!
//! Stores call these before building any backend policy, so a request the
//! contract rejects never reaches the network.

use crate::{
    error::{StateError, StateResult},
    request::{Concurrency, DeleteRequest, SetRequest},
};

const FIRST_WRITE_REQUIRES_ETAG: &str =
    "when FirstWrite is to be enforced, a value must be provided for the ETag";

/// Returns the request's ETag, treating an empty string as absent.
///
/// Hosts that cannot express `null` send `""` for "no ETag".
#[must_use]
pub fn effective_etag(etag: Option<&str>) -> Option<&str> {
    etag.filter(|etag| !etag.is_empty())
}

/// Validates the option combination of a [`SetRequest`].
///
/// # Errors
///
/// Returns [`StateError::InvalidRequest`] if first-write concurrency is
/// requested without an ETag.
pub fn check_set_request_options(req: &SetRequest) -> StateResult<()> {
    check_concurrency("set", &req.key, req.options.concurrency, req.etag.as_deref())
}

/// Validates the option combination of a [`DeleteRequest`].
///
/// # Errors
///
/// Returns [`StateError::InvalidRequest`] if first-write concurrency is
/// requested without an ETag.
pub fn check_delete_request_options(req: &DeleteRequest) -> StateResult<()> {
    check_concurrency("delete", &req.key, req.options.concurrency, req.etag.as_deref())
}

fn check_concurrency(
    operation: &'static str,
    key: &str,
    concurrency: Concurrency,
    etag: Option<&str>,
) -> StateResult<()> {
    if concurrency == Concurrency::FirstWrite && effective_etag(etag).is_none() {
        return Err(StateError::invalid_request(operation, key, FIRST_WRITE_REQUIRES_ETAG));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::request::StateOptions;

    fn first_write() -> StateOptions {
        StateOptions { concurrency: Concurrency::FirstWrite, ..StateOptions::default() }
    }

    #[rstest]
    #[case::last_write_without_etag(Concurrency::LastWrite, None, true)]
    #[case::last_write_with_etag(Concurrency::LastWrite, Some("4"), true)]
    #[case::first_write_with_etag(Concurrency::FirstWrite, Some("4"), true)]
    #[case::first_write_without_etag(Concurrency::FirstWrite, None, false)]
    #[case::first_write_with_empty_etag(Concurrency::FirstWrite, Some(""), false)]
    fn test_set_request_rules(
        #[case] concurrency: Concurrency,
        #[case] etag: Option<&str>,
        #[case] accepted: bool,
    ) {
        let mut req = SetRequest::new("k", json!({"a": 1}));
        req.options.concurrency = concurrency;
        req.etag = etag.map(str::to_owned);

        assert_eq!(check_set_request_options(&req).is_ok(), accepted);
    }

    #[test]
    fn test_delete_first_write_without_etag_is_rejected() {
        let req = DeleteRequest::new("k").with_options(first_write());
        let err = check_delete_request_options(&req).err();

        assert!(matches!(
            err,
            Some(StateError::InvalidRequest { operation: "delete", ref key, .. }) if key == "k"
        ));
    }

    #[test]
    fn test_delete_first_write_with_etag_is_accepted() {
        let req = DeleteRequest::new("k").with_etag("2").with_options(first_write());
        assert!(check_delete_request_options(&req).is_ok());
    }

    #[test]
    fn test_effective_etag() {
        assert_eq!(effective_etag(None), None);
        assert_eq!(effective_etag(Some("")), None);
        assert_eq!(effective_etag(Some("12")), Some("12"));
    }
}
