//! Per-operation policies and their construction from request options.
//!
//! These are the policy values handed across the [`ClusterClient`](crate::ClusterClient)
//! seam. The Aerospike-backed client translates them field by field into the
//! driver's own `WritePolicy`/`ReadPolicy`.
//!
//! Two independent axes are translated on every write or delete:
//!
//! | Request | Policy field | Value |
//! |---------|--------------|-------|
//! | ETag present | `generation_policy` / `generation` | `ExpectGenEqual` / decoded ETag |
//! | ETag absent | `generation_policy` | `None` (unconditional) |
//! | `Consistency::Strong` | `commit_level` | `CommitAll` |
//! | `Consistency::Eventual` | `commit_level` | `CommitMaster` |
//!
//! Reads map `Strong` to `ConsistencyAll` and `Eventual` to
//! `ConsistencyOne`. Policies are plain values built fresh per call.

use std::time::Duration;

use kvstate_state::{Consistency, StateError, StateResult, effective_etag};

use crate::etag::decode_etag;

/// Default total timeout applied to a single operation.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(1);

/// How the cluster treats the record generation on writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationPolicy {
    /// Apply the write regardless of the stored generation.
    #[default]
    None,
    /// Apply the write only if the stored generation equals the policy's.
    ExpectGenEqual,
}

/// Which replicas must acknowledge a write before it is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommitLevel {
    /// The master and every replica.
    #[default]
    CommitAll,
    /// Only the master holding the record.
    CommitMaster,
}

/// How many replicas a read consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConsistencyLevel {
    /// A single replica, the one serving the request.
    #[default]
    ConsistencyOne,
    /// Every replica holding the record.
    ConsistencyAll,
}

/// What a write does when the record already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RecordExistsAction {
    /// Merge the written bins into the existing record.
    #[default]
    Update,
    /// Replace the existing record's bins entirely.
    Replace,
}

/// Policy fields shared by reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasePolicy {
    /// Replicas consulted on read.
    pub consistency_level: ConsistencyLevel,
    /// Total time the client may spend on the operation.
    pub total_timeout: Duration,
}

impl Default for BasePolicy {
    fn default() -> Self {
        Self {
            consistency_level: ConsistencyLevel::default(),
            total_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// Policy for a single-record read.
pub type ReadPolicy = BasePolicy;

/// Policy for a single-record write or delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WritePolicy {
    /// Shared policy fields.
    pub base_policy: BasePolicy,
    /// Generation check mode.
    pub generation_policy: GenerationPolicy,
    /// Expected generation when `generation_policy` is `ExpectGenEqual`.
    pub generation: u32,
    /// Replica acknowledgement requirement.
    pub commit_level: CommitLevel,
    /// Behavior against an existing record.
    pub record_exists_action: RecordExistsAction,
}

impl WritePolicy {
    /// Returns `true` if the write is conditional on the stored generation.
    #[must_use]
    pub fn expects_generation(&self) -> bool {
        self.generation_policy == GenerationPolicy::ExpectGenEqual
    }
}

/// Builds the write/delete policy for an optional ETag and a consistency level.
///
/// `operation` and `key` only label the error for a malformed ETag. An empty
/// ETag is treated as absent. Writes always replace the stored bins so a set
/// fully overwrites the previous payload.
///
/// # Errors
///
/// Returns [`InvalidEtag`](kvstate_state::StateError::InvalidEtag) if the ETag
/// is present but not a base-10 `u32`.
pub fn write_policy(
    operation: &'static str,
    key: &str,
    etag: Option<&str>,
    consistency: Consistency,
) -> StateResult<WritePolicy> {
    let mut policy =
        WritePolicy { record_exists_action: RecordExistsAction::Replace, ..WritePolicy::default() };

    if let Some(etag) = effective_etag(etag) {
        policy.generation = decode_etag(etag).map_err(|e| {
            StateError::invalid_etag_with_source(operation, key, e.etag().to_owned(), e)
        })?;
        policy.generation_policy = GenerationPolicy::ExpectGenEqual;
    }

    policy.commit_level = match consistency {
        Consistency::Strong => CommitLevel::CommitAll,
        Consistency::Eventual => CommitLevel::CommitMaster,
    };

    Ok(policy)
}

/// Builds the read policy for a consistency level.
#[must_use]
pub fn read_policy(consistency: Consistency) -> ReadPolicy {
    let consistency_level = match consistency {
        Consistency::Strong => ConsistencyLevel::ConsistencyAll,
        Consistency::Eventual => ConsistencyLevel::ConsistencyOne,
    };
    ReadPolicy { consistency_level, ..ReadPolicy::default() }
}
