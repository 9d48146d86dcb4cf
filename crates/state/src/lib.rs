//! Backend-agnostic state store contract.
//!
//! This crate defines the [`StateStore`] trait and the request, response and
//! error types shared by every state store backend. A host loads a backend,
//! initializes it once from [`Metadata`], then issues independent
//! [`get`](StateStore::get), [`set`](StateStore::set) and
//! [`delete`](StateStore::delete) calls.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Host runtime                           │
//! │        (decodes requests, chooses consistency/ETag)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    kvstate-state                            │
//! │     StateStore trait │ requests │ StateError │ options      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                kvstate-state-aerospike                      │
//! │   hosts parsing │ ETag/policy translation │ executor        │
//! ├─────────────────────────────────────────────────────────────┤
//! │                  Aerospike cluster                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Optimistic Concurrency
//!
//! Every successful read returns an opaque ETag. Passing it back on a write
//! or delete makes the operation conditional on the record being unchanged
//! since that read; a mismatch surfaces as [`StateError::EtagMismatch`].
//!
//! # Feature Flags
//!
//! - **`testutil`**: assertion macros and key helpers for tests.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod metadata;
pub mod options;
pub mod request;
pub mod store;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use error::{BoxError, StateError, StateResult};
pub use metadata::Metadata;
pub use options::{check_delete_request_options, check_set_request_options, effective_etag};
pub use request::{
    Concurrency, Consistency, DeleteRequest, GetRequest, GetResponse, SetRequest, StateOptions,
};
pub use store::StateStore;
