//! State store trait definition.
//!
//! [`StateStore`] is the contract every backend implements: single-key
//! reads, writes and deletes with optional optimistic concurrency, plus
//! ordered bulk variants.
//!
//! # Concurrency Model
//!
//! Stores hold no locks or caches of their own. Concurrent writers to the
//! same key are serialized by the backend's version check: a write carrying
//! an ETag only applies if the stored version still matches, otherwise it
//! fails with [`StateError::EtagMismatch`](crate::StateError::EtagMismatch).
//! A write without an ETag always applies (last writer wins).

use async_trait::async_trait;

use crate::{
    error::StateResult,
    request::{DeleteRequest, GetRequest, GetResponse, SetRequest},
};

/// Key/value state store with ETag-based optimistic concurrency.
///
/// Implementations must be `Send + Sync`; hosts call them concurrently
/// from many tasks.
///
/// | Method | Description |
/// |--------|-------------|
/// | [`get`](StateStore::get) | Read a key and its ETag |
/// | [`set`](StateStore::set) | Write a key, optionally conditional on an ETag |
/// | [`delete`](StateStore::delete) | Remove a key, optionally conditional on an ETag |
/// | [`bulk_set`](StateStore::bulk_set) | Ordered writes, stopping at the first failure |
/// | [`bulk_delete`](StateStore::bulk_delete) | Ordered deletes, stopping at the first failure |
/// | [`ping`](StateStore::ping) | Verify the backend is reachable |
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Reads a key.
    ///
    /// # Returns
    ///
    /// - `Ok(response)` with data and ETag if the key exists
    /// - `Ok(GetResponse::default())` if the key does not exist
    /// - `Err(...)` on backend failures
    #[must_use = "state operations may fail and errors must be handled"]
    async fn get(&self, req: &GetRequest) -> StateResult<GetResponse>;

    /// Writes a key.
    ///
    /// With an ETag the write only applies if the stored version matches;
    /// otherwise it fails with
    /// [`EtagMismatch`](crate::StateError::EtagMismatch). Without an ETag the
    /// write is unconditional.
    #[must_use = "state operations may fail and errors must be handled"]
    async fn set(&self, req: &SetRequest) -> StateResult<()>;

    /// Deletes a key.
    ///
    /// Follows the same ETag rules as [`set`](StateStore::set). Deleting a key
    /// that does not exist is not an error.
    #[must_use = "state operations may fail and errors must be handled"]
    async fn delete(&self, req: &DeleteRequest) -> StateResult<()>;

    /// Applies [`set`](StateStore::set) to each request in order.
    ///
    /// # Partial Application
    ///
    /// The batch is **not atomic**. Processing stops at the first failing
    /// request and its error is returned; requests before it stay applied
    /// and requests after it are never attempted.
    #[must_use = "state operations may fail and errors must be handled"]
    #[tracing::instrument(skip(self, reqs), fields(count = reqs.len()))]
    async fn bulk_set(&self, reqs: &[SetRequest]) -> StateResult<()> {
        for req in reqs {
            self.set(req).await?;
        }
        Ok(())
    }

    /// Applies [`delete`](StateStore::delete) to each request in order.
    ///
    /// Shares the partial-application semantics of
    /// [`bulk_set`](StateStore::bulk_set).
    #[must_use = "state operations may fail and errors must be handled"]
    #[tracing::instrument(skip(self, reqs), fields(count = reqs.len()))]
    async fn bulk_delete(&self, reqs: &[DeleteRequest]) -> StateResult<()> {
        for req in reqs {
            self.delete(req).await?;
        }
        Ok(())
    }

    /// Checks that the backend is reachable.
    #[must_use = "ping results indicate backend availability and must be inspected"]
    async fn ping(&self) -> StateResult<()>;
}
