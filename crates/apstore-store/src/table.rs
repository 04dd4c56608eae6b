use apstore_filters::Resolver;
use apstore_types::{Iri, Item};
use dashmap::DashMap;

use crate::error::{StorageError, StorageResult};

/// Concurrent IRI → item map; the base substrate of the store.
///
/// Writers to the same key are last-write-wins. Read guards are never held
/// across calls, so no method can deadlock against another.
#[derive(Debug, Default)]
pub struct ObjectTable {
    items: DashMap<Iri, Item>,
}

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert `item` under its own IRI, returning the previous entry.
    pub fn put(&self, item: Item) -> Option<Item> {
        self.items.insert(item.iri().clone(), item)
    }

    pub fn get(&self, iri: &Iri) -> StorageResult<Item> {
        self.find(iri)
            .ok_or_else(|| StorageError::not_found("item", iri))
    }

    pub fn find(&self, iri: &Iri) -> Option<Item> {
        self.items.get(iri).map(|entry| entry.value().clone())
    }

    /// Delete an entry; absent keys are a no-op.
    pub fn remove(&self, iri: &Iri) -> Option<Item> {
        self.items.remove(iri).map(|(_, item)| item)
    }

    pub fn contains(&self, iri: &Iri) -> bool {
        self.items.contains_key(iri)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Atomically fetch the entry at `iri`, inserting `make()` if absent.
    ///
    /// Returns the stored item and whether this call created it.
    pub fn get_or_insert_with(&self, iri: &Iri, make: impl FnOnce() -> Item) -> (Item, bool) {
        let mut created = false;
        let item = self
            .items
            .entry(iri.clone())
            .or_insert_with(|| {
                created = true;
                make()
            })
            .value()
            .clone();
        (item, created)
    }
}

impl Resolver for ObjectTable {
    fn resolve(&self, iri: &Iri) -> Option<Item> {
        self.find(iri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apstore_types::{ItemType, Object};
    use std::sync::Arc;

    fn note(path: &str) -> Item {
        Object::new(Iri::new(format!("https://example.com/{path}")), ItemType::Note).into()
    }

    #[test]
    fn put_get_remove() {
        let table = ObjectTable::new();
        let item = note("n/1");
        assert!(table.put(item.clone()).is_none());
        assert_eq!(table.get(item.iri()).unwrap(), item);
        assert_eq!(table.remove(item.iri()), Some(item.clone()));
        assert!(table.get(item.iri()).unwrap_err().is_not_found());
        assert!(table.remove(item.iri()).is_none());
    }

    #[test]
    fn put_is_last_write_wins() {
        let table = ObjectTable::new();
        let first = note("n/1");
        let mut second = first.clone();
        second
            .on_object(|o| {
                o.name = Some("second".into());
                Ok::<_, StorageError>(())
            })
            .unwrap();
        table.put(first.clone());
        assert_eq!(table.put(second.clone()), Some(first));
        assert_eq!(table.find(second.iri()), Some(second));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn get_or_insert_keeps_existing() {
        let table = ObjectTable::new();
        let existing = note("c");
        table.put(existing.clone());
        let (got, created) = table.get_or_insert_with(existing.iri(), || note("other"));
        assert!(!created);
        assert_eq!(got, existing);
    }

    #[test]
    fn concurrent_get_or_insert_creates_once() {
        let table = Arc::new(ObjectTable::new());
        let iri = Iri::new("https://example.com/c");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                let iri = iri.clone();
                std::thread::spawn(move || table.get_or_insert_with(&iri, || note("c")).1)
            })
            .collect();
        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|created| *created)
            .count();
        assert_eq!(created, 1);
        assert_eq!(table.len(), 1);
    }
}
