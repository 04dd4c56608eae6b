use std::path::Path;

use apstore_types::Iri;
use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;
use crate::error::ConfigError;

/// Configuration for a [`MemoryStorage`](crate::MemoryStorage).
///
/// ```toml
/// cascade_deletes = false
/// collection_audience = ["https://www.w3.org/ns/activitystreams#Public"]
///
/// [capabilities]
/// activitypub = true
/// keys = true
/// passwords = true
/// metadata = true
/// oauth = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Which storage contracts the instance exposes.
    pub capabilities: Capabilities,
    /// When `true`, deleting an item also strips it from every collection
    /// membership index and recomputes the affected counts.
    pub cascade_deletes: bool,
    /// Audience placed in `cc` of materialized collections.
    pub collection_audience: Vec<Iri>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::all(),
            cascade_deletes: false,
            collection_audience: vec![Iri::public()],
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// A configuration that deletes cascade into collection memberships.
    pub fn cascading() -> Self {
        Self {
            cascade_deletes: true,
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for iri in &self.collection_audience {
            iri.validate()
                .map_err(|e| ConfigError::Invalid(format!("collection_audience: {e}")))?;
        }
        Ok(())
    }
}
