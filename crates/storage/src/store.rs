//! Concurrent collection store
//!
//! Maps collection names to collections of schema-less records with
//! store-assigned integer ids.
//!
//! # Design
//!
//! - DashMap: sharded map from name to collection, touched only to look a
//!   collection up or to vivify it
//! - One parking_lot mutex per collection guarding its records and counter
//! - Different collections never contend
//!
//! # Vivification
//!
//! The first write to an unknown name creates the collection through
//! `DashMap::entry().or_insert_with()`, which holds the shard write lock
//! while it checks and inserts. Two racing first-writers therefore end up
//! with the same `Arc<Collection>` and the same lock.
//!
//! The map guard is released before the collection lock is taken, so a long
//! critical section on one collection never blocks lookups of another.
//!
//! # Persistence
//!
//! None. Everything lives in process memory and is lost on restart.

use collstore_core::{validate_collection_name, Error, Fields, Record, RecordId, Result, Timestamp, Value};
use dashmap::DashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::collection::Collection;
use crate::query::Query;
use crate::stats::{StatsCounters, StoreStats};
use crate::transaction::CollectionTxn;

/// Thread-safe store of named record collections
///
/// Construct one per process and share it by `Arc`; tests build a fresh one
/// each.
///
/// # Example
///
/// ```
/// use collstore_core::Fields;
/// use collstore_storage::CollectionStore;
///
/// let store = CollectionStore::new();
/// let alice = store.create("users", Fields::new().with("name", "Alice"))?;
/// assert_eq!(alice.id(), 1);
/// assert_eq!(store.read("users", 1)?, Some(alice));
/// # Ok::<(), collstore_core::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct CollectionStore {
    collections: DashMap<String, Arc<Collection>>,
    stats: StatsCounters,
}

impl CollectionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an existing collection without creating it
    fn existing(&self, name: &str) -> Result<Option<Arc<Collection>>> {
        validate_collection_name(name)?;
        Ok(self.collections.get(name).map(|c| Arc::clone(c.value())))
    }

    /// Look up a collection, creating it (exactly once) if absent
    fn vivify(&self, name: &str) -> Result<Arc<Collection>> {
        validate_collection_name(name)?;
        if let Some(collection) = self.collections.get(name) {
            return Ok(Arc::clone(collection.value()));
        }
        let entry = self.collections.entry(name.to_string()).or_insert_with(|| {
            info!(target: "collstore::store", collection = name, "Collection created");
            Arc::new(Collection::new(name))
        });
        Ok(Arc::clone(entry.value()))
    }

    // ========================================================================
    // CRUD
    // ========================================================================

    /// Insert a record and return a copy with its assigned id
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a bad collection name, or if `fields` names the
    /// reserved `id` field or an empty field.
    pub fn create(&self, collection: &str, fields: Fields) -> Result<Record> {
        fields.validate()?;
        let coll = self.vivify(collection)?;
        let record = coll.lock().create(fields, Timestamp::now());
        self.stats.record_writes(1);
        debug!(target: "collstore::store", collection, id = record.id(), "Record created");
        Ok(record)
    }

    /// Copy of one record, `None` if the collection or id is missing
    pub fn read(&self, collection: &str, id: RecordId) -> Result<Option<Record>> {
        let Some(coll) = self.existing(collection)? else {
            return Ok(None);
        };
        let record = coll.lock().read(id);
        if record.is_some() {
            self.stats.record_read();
        }
        Ok(record)
    }

    /// Copies of all records in ascending id order; empty if the collection
    /// is missing
    pub fn read_all(&self, collection: &str) -> Result<Vec<Record>> {
        let Some(coll) = self.existing(collection)? else {
            return Ok(Vec::new());
        };
        let records = coll.lock().read_all();
        self.stats.record_read();
        Ok(records)
    }

    /// Merge `patch` into a record; fields not named are kept
    ///
    /// Returns `None` (and creates nothing) if the record is missing.
    pub fn update(&self, collection: &str, id: RecordId, patch: Fields) -> Result<Option<Record>> {
        patch.validate()?;
        let Some(coll) = self.existing(collection)? else {
            return Ok(None);
        };
        let updated = coll.lock().update(id, patch, Timestamp::now());
        if updated.is_some() {
            self.stats.record_writes(1);
            debug!(target: "collstore::store", collection, id, "Record updated");
        }
        Ok(updated)
    }

    /// Replace a record's fields wholesale, keeping its id and creation time
    pub fn replace(&self, collection: &str, id: RecordId, fields: Fields) -> Result<Option<Record>> {
        fields.validate()?;
        let Some(coll) = self.existing(collection)? else {
            return Ok(None);
        };
        let replaced = coll.lock().replace(id, fields, Timestamp::now());
        if replaced.is_some() {
            self.stats.record_writes(1);
            debug!(target: "collstore::store", collection, id, "Record replaced");
        }
        Ok(replaced)
    }

    /// Remove a record; `false` if it was not there
    pub fn delete(&self, collection: &str, id: RecordId) -> Result<bool> {
        let Some(coll) = self.existing(collection)? else {
            return Ok(false);
        };
        let removed = coll.lock().delete(id);
        if removed {
            self.stats.record_deletes(1);
            debug!(target: "collstore::store", collection, id, "Record deleted");
        }
        Ok(removed)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Records whose `field` equals `value` exactly
    ///
    /// Linear scan, no index. `"id"` matches against the record id as an Int.
    pub fn find_by_field(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Record>> {
        let Some(coll) = self.existing(collection)? else {
            return Ok(Vec::new());
        };
        let records = coll.lock().find_by_field(field, value);
        self.stats.record_read();
        Ok(records)
    }

    /// Filtered, sorted, paginated read
    ///
    /// The collection lock is held only while copying records out; filters
    /// and sorting run on the copy.
    pub fn query(&self, collection: &str, query: &Query) -> Result<Vec<Record>> {
        let records = self.read_all(collection)?;
        Ok(query.apply(records))
    }

    /// Number of records; 0 for a missing collection
    pub fn count(&self, collection: &str) -> Result<usize> {
        let Some(coll) = self.existing(collection)? else {
            return Ok(0);
        };
        let len = coll.lock().len();
        Ok(len)
    }

    /// Remove every record and return how many were removed
    ///
    /// The collection, its lock and its id counter survive, so ids issued
    /// afterwards continue from where they left off.
    pub fn clear(&self, collection: &str) -> Result<usize> {
        let Some(coll) = self.existing(collection)? else {
            return Ok(0);
        };
        let removed = coll.lock().clear();
        info!(target: "collstore::store", collection, removed, "Collection cleared");
        Ok(removed)
    }

    /// Names of all vivified collections, sorted
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .collections
            .iter()
            .map(|entry| entry.value().name().to_string())
            .collect();
        names.sort();
        names
    }

    /// Snapshot of operation counters
    pub fn stats(&self) -> StoreStats {
        self.stats.snapshot(self.collections.len())
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Run `f` atomically against one collection
    ///
    /// The collection lock is held for the whole closure. On `Ok` every
    /// staged change becomes visible at once; on `Err` or a panic none does.
    /// The collection is vivified if needed. Ids issued inside an aborted
    /// transaction are never reissued; a panic is resumed after the counter
    /// is advanced.
    ///
    /// The lock is not reentrant: calling `self.read`, `self.create` or any
    /// other store method on the same collection from inside `f` deadlocks.
    /// Use the methods on `txn` instead. Other collections may be used
    /// freely.
    ///
    /// # Example
    ///
    /// ```
    /// use collstore_core::{Error, Fields};
    /// use collstore_storage::CollectionStore;
    ///
    /// let store = CollectionStore::new();
    /// let result: Result<(), Error> = store.transaction("accounts", |txn| {
    ///     txn.create(Fields::new().with("balance", 10))?;
    ///     Err(Error::invalid_argument("insufficient funds"))
    /// });
    /// assert!(result.is_err());
    /// assert_eq!(store.count("accounts")?, 0);
    /// # Ok::<(), Error>(())
    /// ```
    pub fn transaction<T, E, F>(&self, collection: &str, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut CollectionTxn) -> std::result::Result<T, E>,
        E: From<Error>,
    {
        let coll = self.vivify(collection)?;
        let mut guard = coll.lock();
        let mut txn = CollectionTxn::new(collection, (*guard).clone());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| f(&mut txn)));
        let result = match outcome {
            Ok(result) => result,
            Err(payload) => {
                guard.advance_counter(txn.last_id());
                drop(guard);
                self.stats.record_transaction(false);
                warn!(target: "collstore::store", collection, "Transaction panicked; rolled back");
                panic::resume_unwind(payload);
            }
        };

        match result {
            Ok(value) => {
                let (working, writes, deletes) = txn.into_parts();
                guard.commit(working);
                drop(guard);
                self.stats.record_writes(writes);
                self.stats.record_deletes(deletes);
                self.stats.record_transaction(true);
                debug!(target: "collstore::store", collection, writes, deletes, "Transaction committed");
                Ok(value)
            }
            Err(e) => {
                guard.advance_counter(txn.last_id());
                drop(guard);
                self.stats.record_transaction(false);
                debug!(target: "collstore::store", collection, "Transaction rolled back");
                Err(e)
            }
        }
    }
}
