//! Single-collection transactions
//!
//! A transaction runs while the collection lock is held and works on a
//! private copy of the collection. If the closure returns `Ok`, the copy
//! replaces the collection's contents in one step; if it returns `Err` (or
//! panics) the copy is dropped and the stored records are untouched.
//!
//! Ids issued inside a transaction that returns `Err` or panics stay burned,
//! so a caller that saw an id inside a rolled-back transaction never sees it
//! reissued.

use collstore_core::{Fields, Record, RecordId, Result, Timestamp, Value};

use crate::collection::CollectionData;

/// Working view of one collection inside [`crate::CollectionStore::transaction`]
#[derive(Debug)]
pub struct CollectionTxn {
    collection: String,
    working: CollectionData,
    writes: u64,
    deletes: u64,
}

impl CollectionTxn {
    pub(crate) fn new(collection: &str, snapshot: CollectionData) -> Self {
        Self {
            collection: collection.to_string(),
            working: snapshot,
            writes: 0,
            deletes: 0,
        }
    }

    /// Name of the collection this transaction is bound to
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Stage a new record
    pub fn create(&mut self, fields: Fields) -> Result<Record> {
        fields.validate()?;
        self.writes += 1;
        Ok(self.working.create(fields, Timestamp::now()))
    }

    /// Read a record as staged so far
    pub fn read(&self, id: RecordId) -> Option<Record> {
        self.working.read(id)
    }

    /// All staged records, ascending id order
    pub fn read_all(&self) -> Vec<Record> {
        self.working.read_all()
    }

    /// Stage a partial update
    pub fn update(&mut self, id: RecordId, patch: Fields) -> Result<Option<Record>> {
        patch.validate()?;
        let updated = self.working.update(id, patch, Timestamp::now());
        if updated.is_some() {
            self.writes += 1;
        }
        Ok(updated)
    }

    /// Stage a delete
    pub fn delete(&mut self, id: RecordId) -> bool {
        let removed = self.working.delete(id);
        if removed {
            self.deletes += 1;
        }
        removed
    }

    /// Exact-match scan over staged records
    pub fn find_by_field(&self, field: &str, value: &Value) -> Vec<Record> {
        self.working.find_by_field(field, value)
    }

    /// Staged record count
    pub fn count(&self) -> usize {
        self.working.len()
    }

    pub(crate) fn last_id(&self) -> RecordId {
        self.working.last_id()
    }

    pub(crate) fn into_parts(self) -> (CollectionData, u64, u64) {
        (self.working, self.writes, self.deletes)
    }
}
