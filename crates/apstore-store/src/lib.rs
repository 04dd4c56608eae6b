//! In-memory object store for ActivityPub items and collections.
//!
//! The store keeps every item in a concurrent [`ObjectTable`] keyed by IRI
//! and every collection's membership in a [`CollectionIndex`]. Reads of a
//! collection run a [`Checks`](apstore_filters::Checks) pipeline over its
//! members and return one page plus a resumable cursor.
//!
//! # Design Rules
//!
//! 1. IRIs are caller-supplied keys; the store never mints them.
//! 2. The first save of an actor or object materializes the collections it
//!    declares. Re-saves never reset them.
//! 3. A collection's `total_items` always equals its membership size, and
//!    loads report the full count regardless of filters.
//! 4. Mutations of one collection are serialized by that collection's lock;
//!    different collections never contend.
//! 5. Deletes remove only the item's own entry unless
//!    [`StoreConfig::cascade_deletes`] is set.
//!
//! # Quick Start
//!
//! ```rust
//! use apstore_filters::{Check, Checks};
//! use apstore_store::{ActivityPubStorage, MemoryStorage};
//! use apstore_types::{Actor, CollectionPath, Iri, ItemType, Object};
//!
//! let store = MemoryStorage::default();
//! let jdoe = Iri::new("https://example.com/~jdoe");
//! store
//!     .save(Actor::with_standard_collections(jdoe.clone(), ItemType::Person).into())
//!     .unwrap();
//!
//! let outbox = CollectionPath::Outbox.of(&jdoe);
//! let note = Object::new(Iri::new("https://example.com/n/1"), ItemType::Note);
//! store.add_to(&outbox, &[note.into()]).unwrap();
//!
//! let page = store
//!     .load_page(&outbox, &Checks::new([Check::has_type([ItemType::Note])]))
//!     .unwrap();
//! assert_eq!(page.items.len(), 1);
//! assert_eq!(page.total_items, 1);
//! ```

pub mod capabilities;
pub mod config;
pub mod error;
pub mod index;
pub mod keys;
pub mod materializer;
pub mod memory;
pub mod metadata;
pub mod oauth;
pub mod password;
pub mod table;
pub mod traits;

pub use capabilities::Capabilities;
pub use config::StoreConfig;
pub use error::{ConfigError, StorageError, StorageResult};
pub use index::{CollectionIndex, Membership};
pub use keys::PrivateKey;
pub use materializer::Materializer;
pub use memory::{CollectionPage, MemoryStorage};
pub use oauth::{AccessData, AuthorizeData, OAuthClient};
pub use table::ObjectTable;
pub use traits::{ActivityPubStorage, KeyStorage, MetadataStorage, OAuthStorage, PasswordStorage};
