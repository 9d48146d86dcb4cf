//! Cluster endpoint parsing.
//!
//! The `hosts` property is a comma-separated list of `host:port` seeds,
//! e.g. `"10.0.0.1:3000,10.0.0.2:3000"`. Parsing happens once at
//! initialization, before any connection is attempted.

use std::fmt;

use kvstate_state::{StateError, StateResult};
use serde::{Deserialize, Serialize};

use crate::config::HOSTS_KEY;

/// A cluster seed node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Host name or IPv4 address.
    pub host: String,
    /// Service port.
    pub port: u16,
}

impl Endpoint {
    /// Creates an endpoint.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parses a comma-separated `host:port` list into endpoints.
///
/// The first `:` in each token separates host from port. Whitespace around
/// a token is ignored, so `"a:1, b:2"` and `" a:1"` are accepted on purpose.
/// The result preserves input order, which the client may use as a hint for
/// connection attempts.
///
/// # Errors
///
/// Returns [`StateError::InvalidConfiguration`] if any token is empty, has no
/// `:`, has an empty host, or has a port that is not a base-10 unsigned
/// integer within the port range.
///
/// # Example
///
/// ```
/// use kvstate_state_aerospike::{Endpoint, parse_hosts};
///
/// let hosts = parse_hosts("10.0.0.1:3000,10.0.0.2:3100")?;
/// assert_eq!(hosts, vec![Endpoint::new("10.0.0.1", 3000), Endpoint::new("10.0.0.2", 3100)]);
/// # Ok::<(), kvstate_state::StateError>(())
/// ```
pub fn parse_hosts(list: &str) -> StateResult<Vec<Endpoint>> {
    list.split(',').map(parse_host_port).collect()
}

fn parse_host_port(token: &str) -> StateResult<Endpoint> {
    let token = token.trim();
    let Some((host, port)) = token.split_once(':') else {
        return Err(invalid(format!("'{token}' is not in host:port form")));
    };

    if host.is_empty() {
        return Err(invalid(format!("'{token}' has an empty host")));
    }

    Ok(Endpoint::new(host, parse_port(token, port)?))
}

fn parse_port(token: &str, port: &str) -> StateResult<u16> {
    // `u32::from_str` accepts a leading '+', which is not a base-10 digit string.
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!("'{token}' has a non-numeric port")));
    }

    let wide: u32 =
        port.parse().map_err(|_| invalid(format!("'{token}' has a port wider than 32 bits")))?;
    u16::try_from(wide).map_err(|_| invalid(format!("'{token}' has a port outside 0-65535")))
}

fn invalid(message: String) -> StateError {
    StateError::invalid_configuration(HOSTS_KEY, message)
}
