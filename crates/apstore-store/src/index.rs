//! Per-collection membership indexes.
//!
//! Each collection IRI owns one [`Membership`] behind its own `Mutex`. The
//! lock is the serialization point for every read-modify-write of that
//! collection: membership, `total_items`, and the re-persisted entity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use apstore_types::{Iri, Item};
use dashmap::DashMap;

use crate::error::{StorageError, StorageResult};

/// Ordered, duplicate-free membership of one collection.
///
/// Each member keeps the item it was added as. Full items are a snapshot;
/// reads prefer the current Object Table entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Membership {
    order: Vec<Iri>,
    members: HashMap<Iri, Item>,
}

impl Membership {
    /// Insert or refresh a member. Returns `true` if it was new.
    ///
    /// A re-added member keeps its position.
    pub fn insert(&mut self, item: Item) -> bool {
        let iri = item.iri().clone();
        if self.members.contains_key(&iri) {
            // Never downgrade a full snapshot to a bare reference.
            if !item.is_reference() {
                self.members.insert(iri, item);
            }
            return false;
        }
        self.order.push(iri.clone());
        self.members.insert(iri, item);
        true
    }

    /// Remove a member. Returns `true` if it was present.
    pub fn remove(&mut self, iri: &Iri) -> bool {
        if self.members.remove(iri).is_none() {
            return false;
        }
        self.order.retain(|member| member != iri);
        true
    }

    pub fn contains(&self, iri: &Iri) -> bool {
        self.members.contains_key(iri)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iris(&self) -> &[Iri] {
        &self.order
    }

    /// Members in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.order.iter().filter_map(|iri| self.members.get(iri))
    }
}

/// Shared handle to one collection's membership.
pub type MembershipSlot = Arc<Mutex<Membership>>;

/// Lock a slot, mapping poisoning to [`StorageError::Internal`].
pub fn lock<'a>(slot: &'a MembershipSlot, collection: &Iri) -> StorageResult<MutexGuard<'a, Membership>> {
    slot.lock().map_err(|_| StorageError::poisoned(collection))
}

/// Collection IRI → membership.
#[derive(Debug, Default)]
pub struct CollectionIndex {
    slots: DashMap<Iri, MembershipSlot>,
}

impl CollectionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `collection`, if an index exists.
    pub fn slot(&self, collection: &Iri) -> Option<MembershipSlot> {
        self.slots.get(collection).map(|entry| Arc::clone(entry.value()))
    }

    /// The slot for `collection`, creating an empty index if absent.
    pub fn ensure(&self, collection: &Iri) -> MembershipSlot {
        Arc::clone(
            self.slots
                .entry(collection.clone())
                .or_insert_with(|| Arc::new(Mutex::new(Membership::default())))
                .value(),
        )
    }

    /// Drop the index of `collection` without taking its lock.
    #[cfg(test)]
    pub(crate) fn drop_index(&self, collection: &Iri) -> bool {
        self.slots.remove(collection).is_some()
    }

    /// `true` while `slot` is still the index registered for `collection`.
    pub fn is_current(&self, collection: &Iri, slot: &MembershipSlot) -> bool {
        self.slots
            .get(collection)
            .is_some_and(|entry| Arc::ptr_eq(entry.value(), slot))
    }

    /// Lock `slot`, failing with `NotFound` if the index of `collection` was
    /// dropped or replaced after the slot was fetched.
    pub fn lock_current<'a>(
        &self,
        collection: &Iri,
        slot: &'a MembershipSlot,
    ) -> StorageResult<MutexGuard<'a, Membership>> {
        let membership = lock(slot, collection)?;
        if !self.is_current(collection, slot) {
            return Err(StorageError::not_found("collection index", collection));
        }
        Ok(membership)
    }

    /// Drop the index of `collection` only if it is still `slot`.
    ///
    /// Callers hold the slot's lock so no writer can land in a retired index.
    pub fn retire(&self, collection: &Iri, slot: &MembershipSlot) -> bool {
        self.slots
            .remove_if(collection, |_, current| Arc::ptr_eq(current, slot))
            .is_some()
    }

    pub fn contains(&self, collection: &Iri) -> bool {
        self.slots.contains_key(collection)
    }

    /// Snapshot of every indexed collection IRI.
    pub fn collections(&self) -> Vec<Iri> {
        self.slots.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
