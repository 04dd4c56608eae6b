//! Storage contracts.
//!
//! [`MemoryStorage`](crate::MemoryStorage) implements all of them; which ones
//! a given instance exposes is decided by its
//! [`Capabilities`](crate::Capabilities).

use apstore_filters::Checks;
use apstore_types::{Collection, Iri, Item, PublicKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StorageError, StorageResult};
use crate::keys::PrivateKey;
use crate::oauth::{AccessData, AuthorizeData, OAuthClient};

/// Item and collection storage.
///
/// Implementations must be thread-safe and uphold:
/// - IRIs are unique keys; `save` is an idempotent upsert.
/// - The first save of an IRI materializes every sub-collection the item
///   declares. Re-saves never touch existing collections.
/// - A collection's `total_items` equals the size of its membership index.
pub trait ActivityPubStorage: Send + Sync {
    /// Load the item at `iri`.
    ///
    /// For collections, members are dereferenced and `checks` run over
    /// them; `total_items` stays the full unfiltered count. `checks` are
    /// ignored for any other item.
    fn load(&self, iri: &Iri, checks: &Checks) -> StorageResult<Item>;

    /// Upsert `item`, materializing its collections on first save.
    /// Returns the item as given.
    fn save(&self, item: Item) -> StorageResult<Item>;

    /// Remove the item's entry. Memberships referencing it are untouched
    /// unless the store cascades deletes.
    fn delete(&self, item: &Item) -> StorageResult<()>;

    /// Store a collection entity and its membership index.
    fn create(&self, collection: Collection) -> StorageResult<Collection>;

    /// Append members to a collection.
    ///
    /// Fails without effect when the collection is missing. Otherwise every
    /// item is attempted and the first per-item error is returned.
    fn add_to(&self, collection: &Iri, items: &[Item]) -> StorageResult<()>;

    /// Remove members from a collection. Same batch policy as `add_to`.
    fn remove_from(&self, collection: &Iri, items: &[Item]) -> StorageResult<()>;
}

/// Private signing keys per actor.
pub trait KeyStorage: Send + Sync {
    /// Store `key` for `iri` and return the public half to publish on the
    /// actor document.
    fn save_key(&self, iri: &Iri, key: PrivateKey) -> StorageResult<PublicKey>;

    fn load_key(&self, iri: &Iri) -> StorageResult<PrivateKey>;
}

/// Hashed passwords per actor.
pub trait PasswordStorage: Send + Sync {
    fn password_set(&self, iri: &Iri, password: &[u8]) -> StorageResult<()>;

    /// `Unauthorized` on mismatch, `NotFound` when no password is set.
    fn password_check(&self, iri: &Iri, password: &[u8]) -> StorageResult<()>;
}

/// Free-form JSON metadata per IRI.
pub trait MetadataStorage: Send + Sync {
    fn save_metadata(&self, iri: &Iri, value: serde_json::Value) -> StorageResult<()>;

    fn load_metadata(&self, iri: &Iri) -> StorageResult<serde_json::Value>;
}

impl dyn MetadataStorage + '_ {
    /// Serialize `value` and store it for `iri`.
    pub fn save_as<T: Serialize>(&self, iri: &Iri, value: &T) -> StorageResult<()> {
        let json = serde_json::to_value(value)
            .map_err(|e| StorageError::Internal(format!("encode metadata for {iri}: {e}")))?;
        self.save_metadata(iri, json)
    }

    /// Load the metadata for `iri` as `T`.
    pub fn load_as<T: DeserializeOwned>(&self, iri: &Iri) -> StorageResult<T> {
        let json = self.load_metadata(iri)?;
        serde_json::from_value(json)
            .map_err(|e| StorageError::Internal(format!("decode metadata for {iri}: {e}")))
    }
}

/// OAuth2 clients, authorization codes, and tokens.
pub trait OAuthStorage: Send + Sync {
    fn create_client(&self, client: OAuthClient) -> StorageResult<()>;
    fn update_client(&self, client: OAuthClient) -> StorageResult<()>;
    fn remove_client(&self, id: &str) -> StorageResult<()>;
    fn get_client(&self, id: &str) -> StorageResult<OAuthClient>;
    /// All clients, ordered by id.
    fn list_clients(&self) -> StorageResult<Vec<OAuthClient>>;

    fn save_authorize(&self, data: AuthorizeData) -> StorageResult<()>;
    fn load_authorize(&self, code: &str) -> StorageResult<AuthorizeData>;
    fn remove_authorize(&self, code: &str) -> StorageResult<()>;

    /// Store an access token, indexing its refresh token if present.
    fn save_access(&self, data: AccessData) -> StorageResult<()>;
    fn load_access(&self, token: &str) -> StorageResult<AccessData>;
    /// Remove an access token and its refresh token.
    fn remove_access(&self, token: &str) -> StorageResult<()>;

    /// Resolve a refresh token to the access data it was issued with.
    fn load_refresh(&self, token: &str) -> StorageResult<AccessData>;
    fn remove_refresh(&self, token: &str) -> StorageResult<()>;
}
