use apstore_filters::{Checks, Cursor};
use apstore_types::{Collection, Iri, Item};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::capabilities::Capabilities;
use crate::config::StoreConfig;
use crate::error::{StorageError, StorageResult};
use crate::index::{lock, CollectionIndex, Membership};
use crate::keys::PrivateKey;
use crate::materializer::Materializer;
use crate::oauth::OAuthTables;
use crate::table::ObjectTable;
use crate::traits::{
    ActivityPubStorage, KeyStorage, MetadataStorage, OAuthStorage, PasswordStorage,
};

// ---------------------------------------------------------------------------
// CollectionPage
// ---------------------------------------------------------------------------

/// One filtered page of a collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollectionPage {
    /// The stored collection entity, without members.
    pub collection: Collection,
    pub items: Vec<Item>,
    /// Full unfiltered membership count.
    pub total_items: usize,
    /// Members that passed the predicates, before pagination.
    pub matched: usize,
    pub next: Option<Cursor>,
}

impl CollectionPage {
    /// The next-page cursor in IRI form, when it has one.
    pub fn next_iri(&self) -> Option<Iri> {
        let cursor = self.next.as_ref()?;
        match cursor.to_iri(&self.collection.id) {
            Ok(iri) => Some(iri),
            Err(e) => {
                debug!(collection = %self.collection.id, error = %e, "cursor has no IRI form");
                None
            }
        }
    }

    /// Fold the page into the collection: `items`, `total_items`, and
    /// `next` (when encodable) are set.
    pub fn into_collection(self) -> Collection {
        let next = self.next_iri();
        let Self {
            mut collection,
            items,
            total_items,
            ..
        } = self;
        collection.items = items;
        collection.total_items = total_items;
        if next.is_some() {
            collection.next = next;
        }
        collection
    }

    pub fn into_item(self) -> Item {
        self.into_collection().into()
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-memory store implementing every storage contract.
///
/// Items live in a sharded [`ObjectTable`]; each collection's membership
/// lives in the [`CollectionIndex`] behind its own lock. The auxiliary
/// stores keep their own concurrent maps.
pub struct MemoryStorage {
    config: StoreConfig,
    table: ObjectTable,
    index: CollectionIndex,
    pub(crate) keys: DashMap<Iri, PrivateKey>,
    pub(crate) passwords: DashMap<Iri, String>,
    pub(crate) metadata: DashMap<Iri, serde_json::Value>,
    pub(crate) oauth: OAuthTables,
}

impl MemoryStorage {
    pub fn new(config: StoreConfig) -> Self {
        info!(
            capabilities = ?config.capabilities.enabled(),
            cascade_deletes = config.cascade_deletes,
            "memory storage constructed"
        );
        Self {
            config,
            table: ObjectTable::new(),
            index: CollectionIndex::new(),
            keys: DashMap::new(),
            passwords: DashMap::new(),
            metadata: DashMap::new(),
            oauth: OAuthTables::default(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.config.capabilities
    }

    pub fn activitypub_storage(&self) -> Option<&dyn ActivityPubStorage> {
        if self.config.capabilities.activitypub {
            Some(self)
        } else {
            None
        }
    }

    pub fn key_storage(&self) -> Option<&dyn KeyStorage> {
        if self.config.capabilities.keys {
            Some(self)
        } else {
            None
        }
    }

    pub fn password_storage(&self) -> Option<&dyn PasswordStorage> {
        if self.config.capabilities.passwords {
            Some(self)
        } else {
            None
        }
    }

    pub fn metadata_storage(&self) -> Option<&dyn MetadataStorage> {
        if self.config.capabilities.metadata {
            Some(self)
        } else {
            None
        }
    }

    pub fn oauth_storage(&self) -> Option<&dyn OAuthStorage> {
        if self.config.capabilities.oauth {
            Some(self)
        } else {
            None
        }
    }

    pub fn table(&self) -> &ObjectTable {
        &self.table
    }

    pub fn index(&self) -> &CollectionIndex {
        &self.index
    }

    /// Load one filtered page of the collection at `iri`.
    pub fn load_page(&self, iri: &Iri, checks: &Checks) -> StorageResult<CollectionPage> {
        iri.validate()?;
        let collection = self.load_collection(iri)?;
        self.page_of(collection, checks)
    }

    /// Member IRIs of a collection, in order.
    pub fn members(&self, iri: &Iri) -> StorageResult<Vec<Iri>> {
        let slot = self
            .index
            .slot(iri)
            .ok_or_else(|| StorageError::not_found("collection index", iri))?;
        let membership = lock(&slot, iri)?;
        Ok(membership.iris().to_vec())
    }

    fn materializer(&self) -> Materializer<'_> {
        Materializer::new(&self.table, &self.index, &self.config.collection_audience)
    }

    fn load_collection(&self, iri: &Iri) -> StorageResult<Collection> {
        match self.table.get(iri)? {
            Item::Collection(col) => Ok(col),
            other => Err(StorageError::mismatch(iri, "Collection", other.variant_name())),
        }
    }

    fn page_of(&self, collection: Collection, checks: &Checks) -> StorageResult<CollectionPage> {
        let snapshot: Vec<Item> = match self.index.slot(&collection.id) {
            Some(slot) => {
                let membership = lock(&slot, &collection.id)?;
                let items: Vec<Item> = membership.items().cloned().collect();
                items
            }
            None => Vec::new(),
        };
        let total_items = snapshot.len();
        let members = snapshot
            .into_iter()
            .map(|member| self.dereference(member))
            .collect();
        let page = checks.run(members, &self.table);
        Ok(CollectionPage {
            collection,
            items: page.items,
            total_items,
            matched: page.matched,
            next: page.next,
        })
    }

    /// The current table entry for a member, falling back to the item it
    /// was added as.
    fn dereference(&self, member: Item) -> Item {
        match self.table.find(member.iri()) {
            Some(full) => full,
            None => {
                if !member.is_reference() {
                    warn!(member = %member.iri(), "member missing from object table; using index snapshot");
                }
                member
            }
        }
    }

    /// Save the full items of a batch so they can be indexed.
    ///
    /// Bare references and the collection itself are indexed as given.
    /// Returns the items to index and the first failure.
    fn store_members(&self, collection: &Iri, items: &[Item]) -> (Vec<Item>, Option<StorageError>) {
        let mut accepted = Vec::with_capacity(items.len());
        let mut first_err = None;
        for item in items {
            let stored = if let Err(e) = item.iri().validate() {
                Err(StorageError::from(e))
            } else if item.is_reference() || item.iri() == collection {
                Ok(())
            } else {
                self.save(item.clone()).map(|_| ())
            };
            match stored {
                Ok(()) => accepted.push(item.clone()),
                Err(e) => {
                    warn!(collection = %collection, member = %item.iri(), error = %e, "member not stored");
                    first_err.get_or_insert(e);
                }
            }
        }
        (accepted, first_err)
    }

    /// Re-persist the collection entity with its count synced to `membership`.
    ///
    /// Callers hold the collection's lock.
    fn persist_count(&self, iri: &Iri, membership: &Membership) -> StorageResult<()> {
        let mut col = self.load_collection(iri)?;
        col.items.clear();
        col.total_items = membership.len();
        self.table.put(col.into());
        Ok(())
    }

    fn save_collection(&self, mut col: Collection) -> StorageResult<()> {
        let members = std::mem::take(&mut col.items);
        let (accepted, first_err) = self.store_members(&col.id, &members);

        let mut slot = self.index.ensure(&col.id);
        loop {
            let mut membership = lock(&slot, &col.id)?;
            if !self.index.is_current(&col.id, &slot) {
                // Retired by a concurrent delete while we waited.
                drop(membership);
                slot = self.index.ensure(&col.id);
                continue;
            }
            for member in accepted {
                membership.insert(member);
            }
            col.total_items = membership.len();
            let total = col.total_items;
            let iri = col.id.clone();
            self.table.put(col.into());
            drop(membership);

            debug!(collection = %iri, total, "saved collection");
            return first_err.map_or(Ok(()), Err);
        }
    }

    /// Run `f` under the lock of `iri`'s own index, then drop that index.
    ///
    /// Writers that fetched the slot earlier see it retired once they get
    /// the lock. Returns `f`'s result and whether an index was dropped.
    fn retire_index<R>(&self, iri: &Iri, f: impl FnOnce() -> R) -> StorageResult<(R, bool)> {
        let Some(slot) = self.index.slot(iri) else {
            return Ok((f(), false));
        };
        let _membership = lock(&slot, iri)?;
        let out = f();
        Ok((out, self.index.retire(iri, &slot)))
    }

    /// Strip `iri` from every membership index.
    fn cascade_delete(&self, iri: &Iri) -> StorageResult<()> {
        for collection in self.index.collections() {
            let Some(slot) = self.index.slot(&collection) else {
                continue;
            };
            let mut membership = match self.index.lock_current(&collection, &slot) {
                Ok(membership) => membership,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            };
            if membership.remove(iri) {
                self.persist_count(&collection, &membership)?;
                debug!(collection = %collection, member = %iri, "cascaded delete");
            }
        }
        Ok(())
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("items", &self.table.len())
            .field("collections", &self.index.len())
            .field("capabilities", &self.config.capabilities)
            .finish()
    }
}

fn validate_item(item: &Item) -> StorageResult<()> {
    if item.is_reference() {
        return Err(StorageError::InvalidArgument(format!(
            "cannot store bare reference {}",
            item.iri()
        )));
    }
    item.iri().validate()?;
    Ok(())
}

impl ActivityPubStorage for MemoryStorage {
    fn load(&self, iri: &Iri, checks: &Checks) -> StorageResult<Item> {
        iri.validate()?;
        match self.table.get(iri)? {
            Item::Collection(col) => Ok(self.page_of(col, checks)?.into_item()),
            other => Ok(other),
        }
    }

    fn save(&self, item: Item) -> StorageResult<Item> {
        validate_item(&item)?;
        let iri = item.iri().clone();
        let first = !self.table.contains(&iri);
        if first {
            let created = self.materializer().materialize(&item)?;
            if created > 0 {
                debug!(iri = %iri, created, "materialized declared collections");
            }
        }

        match &item {
            Item::Collection(col) => self.save_collection(col.clone())?,
            _ => {
                let (_, dropped) = self.retire_index(&iri, || self.table.put(item.clone()))?;
                if dropped {
                    debug!(iri = %iri, "collection replaced by non-collection; index dropped");
                }
            }
        }
        debug!(iri = %iri, kind = item.variant_name(), first, "saved item");
        Ok(item)
    }

    fn delete(&self, item: &Item) -> StorageResult<()> {
        let iri = item.iri();
        iri.validate()?;
        let (existed, dropped_index) = self.retire_index(iri, || self.table.remove(iri).is_some())?;
        if self.config.cascade_deletes {
            self.cascade_delete(iri)?;
        }
        debug!(iri = %iri, existed, dropped_index, "deleted item");
        Ok(())
    }

    fn create(&self, collection: Collection) -> StorageResult<Collection> {
        let iri = collection.id.clone();
        self.save(collection.into())?;
        self.load_collection(&iri)
    }

    fn add_to(&self, collection: &Iri, items: &[Item]) -> StorageResult<()> {
        collection.validate()?;
        self.load_collection(collection)?;
        let slot = self
            .index
            .slot(collection)
            .ok_or_else(|| StorageError::not_found("collection index", collection))?;

        let (accepted, first_err) = self.store_members(collection, items);

        let mut membership = self.index.lock_current(collection, &slot)?;
        let mut added = 0;
        for member in accepted {
            if membership.insert(member) {
                added += 1;
            }
        }
        self.persist_count(collection, &membership)?;
        debug!(collection = %collection, added, total = membership.len(), "added members");
        first_err.map_or(Ok(()), Err)
    }

    fn remove_from(&self, collection: &Iri, items: &[Item]) -> StorageResult<()> {
        collection.validate()?;
        self.load_collection(collection)?;
        let slot = self
            .index
            .slot(collection)
            .ok_or_else(|| StorageError::not_found("collection index", collection))?;

        let mut membership = self.index.lock_current(collection, &slot)?;
        let mut removed = 0;
        let mut first_err = None;
        for item in items {
            match item.iri().validate() {
                Ok(()) => {
                    if membership.remove(item.iri()) {
                        removed += 1;
                    }
                }
                Err(e) => {
                    first_err.get_or_insert(StorageError::from(e));
                }
            }
        }
        self.persist_count(collection, &membership)?;
        debug!(collection = %collection, removed, total = membership.len(), "removed members");
        first_err.map_or(Ok(()), Err)
    }
}
