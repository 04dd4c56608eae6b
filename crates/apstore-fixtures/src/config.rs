use apstore_types::Iri;
use serde::{Deserialize, Serialize};

/// IRI of the actor every generated item is attributed to.
pub const ROOT_IRI: &str = "https://example.com/~root";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub root: Iri,
    /// Fixed seed for reproducible runs; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root: Iri::new(ROOT_IRI),
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = GeneratorConfig::default();
        assert_eq!(c.root.as_str(), ROOT_IRI);
        assert!(c.seed.is_none());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c: GeneratorConfig = toml::from_str("seed = 42").unwrap();
        assert_eq!(c, GeneratorConfig::seeded(42));
    }
}
