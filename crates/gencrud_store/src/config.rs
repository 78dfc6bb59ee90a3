//! Store configuration.

use serde::{Deserialize, Serialize};

/// Identifier used by [`Configuration::default`].
pub const DEFAULT_IDENTIFIER: &str = "default";

/// Selects which store a handle opens and how it may be used.
///
/// Handles opened with the same identifier share their data. The default
/// configuration keeps its store for the life of the process; stores
/// opened through [`Configuration::in_memory`] are discarded once the last
/// handle to them is gone.
///
/// # Example
///
/// ```
/// use gencrud_store::Configuration;
///
/// let config = Configuration::in_memory("inventory").with_read_only(true);
/// assert_eq!(config.identifier(), "inventory");
/// assert!(config.read_only());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    identifier: String,
    read_only: bool,
    in_memory: bool,
}

impl Default for Configuration {
    /// The configuration generated convenience methods use: the shared,
    /// process-lifetime store named [`DEFAULT_IDENTIFIER`], writable.
    fn default() -> Self {
        Self {
            identifier: DEFAULT_IDENTIFIER.to_owned(),
            read_only: false,
            in_memory: false,
        }
    }
}

impl Configuration {
    /// Configuration for the in-memory store named `identifier`.
    ///
    /// Its data lives only as long as some handle to it does.
    pub fn in_memory(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            in_memory: true,
            ..Self::default()
        }
    }

    /// Configuration for the store named `identifier`, kept for the life of
    /// the process like the default store.
    pub fn named(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Self::default()
        }
    }

    /// Sets whether writes through this configuration are rejected.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Returns the store identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns `true` if writes are rejected.
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Returns `true` if the store is discarded with its last handle.
    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_shared_and_writable() {
        let config = Configuration::default();
        assert_eq!(config.identifier(), DEFAULT_IDENTIFIER);
        assert!(!config.read_only());
        assert!(!config.is_in_memory());
    }

    #[test]
    fn in_memory_and_named_differ_only_in_lifetime() {
        let transient = Configuration::in_memory("cache");
        let named = Configuration::named("cache");
        assert_eq!(transient.identifier(), named.identifier());
        assert!(transient.is_in_memory());
        assert!(!named.is_in_memory());
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let config: Configuration = serde_json::from_str(r#"{ "identifier": "audit" }"#).unwrap();
        assert_eq!(config, Configuration::named("audit"));

        let config: Configuration =
            serde_json::from_str(r#"{ "identifier": "scratch", "in_memory": true }"#).unwrap();
        assert_eq!(config, Configuration::in_memory("scratch"));

        let config: Configuration = serde_json::from_str(r#"{ "read_only": true }"#).unwrap();
        assert_eq!(config.identifier(), DEFAULT_IDENTIFIER);
        assert!(config.read_only());
    }
}
