use serde::{Deserialize, Serialize};

/// Which storage contracts a store instance exposes.
///
/// Resolved once at construction; the accessors on
/// [`MemoryStorage`](crate::MemoryStorage) consult it instead of probing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub activitypub: bool,
    pub keys: bool,
    pub passwords: bool,
    pub metadata: bool,
    pub oauth: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::all()
    }
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            activitypub: true,
            keys: true,
            passwords: true,
            metadata: true,
            oauth: true,
        }
    }

    pub fn none() -> Self {
        Self {
            activitypub: false,
            keys: false,
            passwords: false,
            metadata: false,
            oauth: false,
        }
    }

    /// Names of the enabled contracts, for logs.
    pub fn enabled(&self) -> Vec<&'static str> {
        [
            (self.activitypub, "activitypub"),
            (self.keys, "keys"),
            (self.passwords, "passwords"),
            (self.metadata, "metadata"),
            (self.oauth, "oauth"),
        ]
        .into_iter()
        .filter_map(|(on, name)| on.then_some(name))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enabled_lists_names_in_order() {
        let caps = Capabilities {
            keys: false,
            oauth: false,
            ..Capabilities::all()
        };
        assert_eq!(caps.enabled(), vec!["activitypub", "passwords", "metadata"]);
        assert!(Capabilities::none().enabled().is_empty());
    }
}
