//! Component metadata supplied by the host at initialization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// String properties configured for a state store component.
///
/// Hosts pass the same map to every store kind; each store reads the
/// properties it understands and ignores the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Raw configuration properties.
    #[serde(default)]
    pub properties: HashMap<String, String>,
}

impl Metadata {
    /// Creates metadata from key/value pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self { properties: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    /// Returns the property value, treating an empty string as absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str).filter(|value| !value.is_empty())
    }
}
