//! Configuration for the Aerospike state store.
//!
//! Hosts usually hand the store a flat string map ([`Metadata`]); programmatic
//! callers can use the validating builder or deserialize the config directly.

use std::time::Duration;

use kvstate_state::{Metadata, StateError, StateResult};
use serde::{Deserialize, Serialize};

use crate::{
    client::{ClientPolicy, DEFAULT_CONNECT_TIMEOUT},
    hosts::{Endpoint, parse_hosts},
    policy::DEFAULT_OPERATION_TIMEOUT,
};

/// Metadata property holding the comma-separated `host:port` seed list.
pub const HOSTS_KEY: &str = "hosts";

/// Metadata property holding the namespace.
pub const NAMESPACE_KEY: &str = "namespace";

/// Metadata property holding the optional set name.
pub const SET_KEY: &str = "set";

/// Configuration for [`AerospikeStore`](crate::AerospikeStore).
///
/// # Key Scoping
///
/// Every record is addressed by `(namespace, set, key)`:
///
/// - **Namespace**: required, must be configured on the cluster
/// - **Set**: optional collection within the namespace; empty selects the default set
///
/// # Example
///
/// ```
/// use kvstate_state_aerospike::{AerospikeConfig, Endpoint};
///
/// let config = AerospikeConfig::builder()
///     .hosts(vec![Endpoint::new("127.0.0.1", 3000)])
///     .namespace("test")
///     .set("orders")
///     .build()?;
/// assert_eq!(config.set(), "orders");
/// # Ok::<(), kvstate_state::StateError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAerospikeConfig")]
pub struct AerospikeConfig {
    /// Seed endpoints, in connection-attempt order.
    pub(crate) hosts: Vec<Endpoint>,

    /// Namespace for every record.
    pub(crate) namespace: String,

    /// Set for every record; empty selects the default set.
    pub(crate) set: String,

    /// Time allowed for the initial cluster connection.
    #[serde(with = "humantime_serde")]
    pub(crate) connect_timeout: Duration,

    /// Total timeout applied to each operation.
    #[serde(with = "humantime_serde")]
    pub(crate) operation_timeout: Duration,
}

/// Wire shape of [`AerospikeConfig`]; deserialized values go through the
/// validating constructor.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAerospikeConfig {
    hosts: Vec<Endpoint>,
    namespace: String,
    #[serde(default)]
    set: String,
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    connect_timeout: Duration,
    #[serde(with = "humantime_serde", default = "default_operation_timeout")]
    operation_timeout: Duration,
}

impl TryFrom<RawAerospikeConfig> for AerospikeConfig {
    type Error = StateError;

    fn try_from(raw: RawAerospikeConfig) -> StateResult<Self> {
        Self::builder()
            .hosts(raw.hosts)
            .namespace(raw.namespace)
            .set(raw.set)
            .connect_timeout(raw.connect_timeout)
            .operation_timeout(raw.operation_timeout)
            .build()
    }
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_operation_timeout() -> Duration {
    DEFAULT_OPERATION_TIMEOUT
}

#[bon::bon]
impl AerospikeConfig {
    /// Creates a new configuration, validating all required fields.
    ///
    /// # Arguments
    ///
    /// * `hosts` - Seed endpoints. At least one must be provided.
    /// * `namespace` - Namespace for every record.
    ///
    /// # Optional Fields
    ///
    /// * `set` - Set name (default: empty, the default set).
    /// * `connect_timeout` - Initial connection timeout (default: 5 seconds).
    /// * `operation_timeout` - Per-operation total timeout (default: 1 second).
    ///
    /// # Errors
    ///
    /// Returns [`StateError::MissingConfiguration`] if no hosts are given or
    /// the namespace is empty.
    #[builder]
    pub fn new(
        hosts: Vec<Endpoint>,
        #[builder(into)] namespace: String,
        #[builder(into, default)] set: String,
        #[builder(default = DEFAULT_CONNECT_TIMEOUT)] connect_timeout: Duration,
        #[builder(default = DEFAULT_OPERATION_TIMEOUT)] operation_timeout: Duration,
    ) -> StateResult<Self> {
        if hosts.is_empty() {
            return Err(StateError::missing_configuration(HOSTS_KEY));
        }

        if namespace.is_empty() {
            return Err(StateError::missing_configuration(NAMESPACE_KEY));
        }

        Ok(Self { hosts, namespace, set, connect_timeout, operation_timeout })
    }

    /// Builds a configuration from host-supplied metadata.
    ///
    /// Validation runs in a fixed order so the first problem reported is
    /// deterministic: `hosts` presence, `namespace` presence, then `hosts`
    /// syntax.
    ///
    /// # Errors
    ///
    /// - [`StateError::MissingConfiguration`] if `hosts` or `namespace` is absent or empty
    /// - [`StateError::InvalidConfiguration`] if `hosts` is malformed
    pub fn from_metadata(metadata: &Metadata) -> StateResult<Self> {
        let hosts = metadata
            .get(HOSTS_KEY)
            .ok_or_else(|| StateError::missing_configuration(HOSTS_KEY))?;
        let namespace = metadata
            .get(NAMESPACE_KEY)
            .ok_or_else(|| StateError::missing_configuration(NAMESPACE_KEY))?;

        Self::builder()
            .hosts(parse_hosts(hosts)?)
            .namespace(namespace)
            .maybe_set(metadata.get(SET_KEY))
            .build()
    }

    /// Returns the seed endpoints.
    #[must_use]
    pub fn hosts(&self) -> &[Endpoint] {
        &self.hosts
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the set name; empty means the default set.
    #[must_use]
    pub fn set(&self) -> &str {
        &self.set
    }

    /// Returns the initial connection timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the per-operation total timeout.
    #[must_use]
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Builds the client policy used to open the cluster connection.
    pub(crate) fn client_policy(&self) -> ClientPolicy {
        ClientPolicy { timeout: self.connect_timeout, ..ClientPolicy::default() }
    }
}
