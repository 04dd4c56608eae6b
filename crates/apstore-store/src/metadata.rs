use apstore_types::Iri;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::memory::MemoryStorage;
use crate::traits::MetadataStorage;

impl MetadataStorage for MemoryStorage {
    fn save_metadata(&self, iri: &Iri, value: serde_json::Value) -> StorageResult<()> {
        iri.validate()?;
        self.metadata.insert(iri.clone(), value);
        debug!(iri = %iri, "saved metadata");
        Ok(())
    }

    fn load_metadata(&self, iri: &Iri) -> StorageResult<serde_json::Value> {
        self.metadata
            .get(iri)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StorageError::not_found("metadata for", iri))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        display_name: String,
        follower_count: u32,
    }

    fn jdoe() -> Iri {
        Iri::new("https://example.com/~jdoe")
    }

    #[test]
    fn typed_roundtrip() {
        let store = MemoryStorage::default();
        let meta = store.metadata_storage().unwrap();
        let profile = Profile {
            display_name: "J. Doe".into(),
            follower_count: 3,
        };
        meta.save_as(&jdoe(), &profile).unwrap();
        assert_eq!(meta.load_as::<Profile>(&jdoe()).unwrap(), profile);
    }

    #[test]
    fn missing_metadata_is_not_found() {
        let store = MemoryStorage::default();
        assert!(store.load_metadata(&jdoe()).unwrap_err().is_not_found());
    }

    #[test]
    fn wrong_shape_is_internal_error() {
        let store = MemoryStorage::default();
        store
            .save_metadata(&jdoe(), serde_json::json!({"unexpected": true}))
            .unwrap();
        let meta = store.metadata_storage().unwrap();
        assert!(matches!(
            meta.load_as::<Profile>(&jdoe()),
            Err(StorageError::Internal(_))
        ));
    }
}
