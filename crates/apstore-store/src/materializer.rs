use apstore_types::{Collection, CollectionPath, Iri, Item};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::index::CollectionIndex;
use crate::table::ObjectTable;

/// A sub-collection an item declares: where it lives and who owns it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub path: CollectionPath,
    pub iri: Iri,
    pub owner: Iri,
}

/// Sub-collections declared by `item`.
///
/// Actors contribute their inbox/outbox/followers/following/liked and the
/// hidden blocked/ignored paths, plus whatever their object base declares.
/// Objects and activities contribute replies/likes/shares. Links,
/// collections, and bare references declare nothing.
pub fn targets(item: &Item) -> Vec<Target> {
    let owner = item.iri();
    let declared = match item {
        Item::Actor(actor) => {
            let mut all = actor.declared_collections();
            all.extend(actor.base.declared_collections());
            all
        }
        Item::Object(object) => object.declared_collections(),
        Item::Activity(activity) => activity.base.declared_collections(),
        Item::Link(_) | Item::Collection(_) | Item::Iri(_) => Vec::new(),
    };
    declared
        .into_iter()
        .filter(|(_, iri)| !iri.is_empty() && iri != owner)
        .map(|(path, iri)| Target {
            path,
            iri,
            owner: owner.clone(),
        })
        .collect()
}

/// Creates declared sub-collections on an item's first save.
pub struct Materializer<'a> {
    table: &'a ObjectTable,
    index: &'a CollectionIndex,
    audience: &'a [Iri],
}

impl<'a> Materializer<'a> {
    pub fn new(table: &'a ObjectTable, index: &'a CollectionIndex, audience: &'a [Iri]) -> Self {
        Self {
            table,
            index,
            audience,
        }
    }

    /// An empty ordered collection at `target`.
    pub fn empty_collection(&self, target: &Target) -> Collection {
        let mut col = Collection::ordered(target.iri.clone(), Some(target.owner.clone()));
        col.cc = self.audience.to_vec();
        let now = Utc::now();
        col.published = Some(DateTime::from_timestamp(now.timestamp(), 0).unwrap_or(now));
        col
    }

    /// Get-or-create every collection `item` declares.
    ///
    /// All targets are checked before anything is written: a target IRI
    /// holding a non-collection fails with `TypeMismatch` and leaves the
    /// table untouched. Existing collections are never overwritten.
    ///
    /// Returns the number of collections created by this call.
    pub fn materialize(&self, item: &Item) -> StorageResult<usize> {
        let targets = targets(item);
        for target in &targets {
            if let Some(existing) = self.table.find(&target.iri) {
                if !existing.is_collection() {
                    return Err(StorageError::mismatch(
                        &target.iri,
                        "Collection",
                        existing.variant_name(),
                    ));
                }
            }
        }

        let mut created = 0;
        for target in &targets {
            let (stored, inserted) = self
                .table
                .get_or_insert_with(&target.iri, || self.empty_collection(target).into());
            if !stored.is_collection() {
                // Lost a race to a non-collection writer.
                return Err(StorageError::mismatch(
                    &target.iri,
                    "Collection",
                    stored.variant_name(),
                ));
            }
            self.index.ensure(&target.iri);
            if inserted {
                created += 1;
                debug!(iri = %target.iri, path = %target.path, owner = %target.owner, "materialized collection");
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apstore_types::{Actor, ItemType, Object};

    fn jdoe() -> Iri {
        Iri::new("https://example.com/~jdoe")
    }

    #[test]
    fn actor_targets_include_hidden_and_object_collections() {
        let mut actor = Actor::with_standard_collections(jdoe(), ItemType::Person);
        actor.base.likes = Some(jdoe().add_path("likes"));
        let paths: Vec<_> = targets(&actor.into()).into_iter().map(|t| t.path).collect();
        assert_eq!(
            paths,
            vec![
                CollectionPath::Inbox,
                CollectionPath::Outbox,
                CollectionPath::Followers,
                CollectionPath::Following,
                CollectionPath::Liked,
                CollectionPath::Blocked,
                CollectionPath::Ignored,
                CollectionPath::Likes,
            ]
        );
    }

    #[test]
    fn links_and_collections_declare_nothing() {
        let col = Collection::ordered(Iri::new("https://example.com/c"), None);
        assert!(targets(&col.into()).is_empty());
        assert!(targets(&Item::Iri(jdoe())).is_empty());
    }

    #[test]
    fn materialize_creates_owned_public_collections() {
        let table = ObjectTable::new();
        let index = CollectionIndex::new();
        let audience = [Iri::public()];
        let m = Materializer::new(&table, &index, &audience);

        let actor: Item = Actor::with_standard_collections(jdoe(), ItemType::Person).into();
        assert_eq!(m.materialize(&actor).unwrap(), 7);
        assert_eq!(m.materialize(&actor).unwrap(), 0);

        let inbox = table
            .get(&CollectionPath::Inbox.of(&jdoe()))
            .unwrap()
            .into_collection()
            .unwrap();
        assert_eq!(inbox.kind, ItemType::OrderedCollection);
        assert_eq!(inbox.attributed_to, Some(jdoe()));
        assert_eq!(inbox.cc, vec![Iri::public()]);
        assert_eq!(inbox.total_items, 0);
        let published = inbox.published.unwrap();
        assert_eq!(published.timestamp_subsec_nanos(), 0);
        assert!(index.contains(&inbox.id));
    }

    #[test]
    fn non_collection_at_target_aborts_before_writing() {
        let table = ObjectTable::new();
        let index = CollectionIndex::new();
        let m = Materializer::new(&table, &index, &[]);

        let mut ob = Object::new(Iri::new("https://example.com/n/1"), ItemType::Note);
        ob.replies = Some(ob.id.add_path("replies"));
        ob.likes = Some(ob.id.add_path("likes"));
        table.put(Object::new(ob.id.add_path("likes"), ItemType::Note).into());

        let err = m.materialize(&ob.clone().into()).unwrap_err();
        assert!(matches!(err, StorageError::TypeMismatch { .. }));
        assert!(!table.contains(&ob.id.add_path("replies")));
        assert!(index.is_empty());
    }
}
