//! Item model for the apstore ActivityPub object store.
//!
//! Every other apstore crate depends on `apstore-types`.
//!
//! # Key Types
//!
//! - [`Iri`]: opaque identifier and storage key
//! - [`ItemType`]: ActivityStreams 2.0 vocabulary type
//! - [`Item`]: closed union of Object, Actor, Activity, Link, Collection,
//!   and bare IRI references
//! - [`CollectionPath`]: well-known sub-collection suffixes (inbox, likes, ...)

pub mod error;
pub mod iri;
pub mod item;
pub mod paths;
pub mod vocabulary;

pub use error::TypeError;
pub use iri::{Iri, PUBLIC_NS};
pub use item::{Activity, Actor, Collection, Item, Link, Object, PublicKey};
pub use paths::{CollectionPath, ACTOR_COLLECTIONS, HIDDEN_COLLECTIONS, OBJECT_COLLECTIONS};
pub use vocabulary::{
    ItemType, ACTIVITY_TYPES, ACTOR_TYPES, COLLECTION_TYPES, LINK_TYPES, OBJECT_TYPES,
};
