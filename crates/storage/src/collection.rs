//! Per-collection state
//!
//! Each collection owns its records, its id counter and the single mutex that
//! guards both. Every operation on a collection, reads included, runs with
//! that mutex held, so a reader can never see a record mid-write.

use collstore_core::{Fields, Record, RecordId, Timestamp, Value};
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeMap;

/// Records and id counter of one collection
///
/// Records are keyed by id, so iteration order is ascending id order.
#[derive(Debug, Clone, Default)]
pub(crate) struct CollectionData {
    records: BTreeMap<RecordId, Record>,
    /// Last id handed out; 0 means none yet
    last_id: RecordId,
}

impl CollectionData {
    /// Advance the counter and return the new id
    fn issue_id(&mut self) -> RecordId {
        self.last_id += 1;
        self.last_id
    }

    pub(crate) fn last_id(&self) -> RecordId {
        self.last_id
    }

    pub(crate) fn create(&mut self, fields: Fields, at: Timestamp) -> Record {
        let id = self.issue_id();
        let record = Record::new(id, fields, at);
        self.records.insert(id, record.clone());
        record
    }

    pub(crate) fn read(&self, id: RecordId) -> Option<Record> {
        self.records.get(&id).cloned()
    }

    pub(crate) fn read_all(&self) -> Vec<Record> {
        self.records.values().cloned().collect()
    }

    pub(crate) fn update(&mut self, id: RecordId, patch: Fields, at: Timestamp) -> Option<Record> {
        let record = self.records.get_mut(&id)?;
        record.apply_patch(patch, at);
        Some(record.clone())
    }

    pub(crate) fn replace(&mut self, id: RecordId, fields: Fields, at: Timestamp) -> Option<Record> {
        let record = self.records.get_mut(&id)?;
        record.replace_fields(fields, at);
        Some(record.clone())
    }

    pub(crate) fn delete(&mut self, id: RecordId) -> bool {
        self.records.remove(&id).is_some()
    }

    pub(crate) fn find_by_field(&self, field: &str, value: &Value) -> Vec<Record> {
        self.records
            .values()
            .filter(|record| record.get(field).as_ref() == Some(value))
            .cloned()
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Drop every record; the counter is kept so ids are never reissued
    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }

    /// Install a transaction's working set
    pub(crate) fn commit(&mut self, working: CollectionData) {
        *self = working;
    }

    /// Keep ids issued by an aborted transaction burned
    pub(crate) fn advance_counter(&mut self, last_id: RecordId) {
        self.last_id = self.last_id.max(last_id);
    }
}

/// A named collection and its lock
#[derive(Debug)]
pub(crate) struct Collection {
    name: String,
    data: Mutex<CollectionData>,
}

impl Collection {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Mutex::new(CollectionData::default()),
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Enter the critical section
    pub(crate) fn lock(&self) -> MutexGuard<'_, CollectionData> {
        self.data.lock()
    }
}
