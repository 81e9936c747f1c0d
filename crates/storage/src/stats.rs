//! Operation counters for the collection store

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the store's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Point reads that found a record, plus every scan and query
    pub reads: u64,
    /// Creates, updates and replaces that changed a record
    pub writes: u64,
    /// Deletes that removed a record
    pub deletes: u64,
    /// Committed transactions
    pub transactions: u64,
    /// Transactions rolled back
    pub aborted_transactions: u64,
    /// Collections vivified so far
    pub collections: usize,
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    reads: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
    transactions: AtomicU64,
    aborted_transactions: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_writes(&self, n: u64) {
        self.writes.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn record_deletes(&self, n: u64) {
        self.deletes.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn record_transaction(&self, committed: bool) {
        if committed {
            self.transactions.fetch_add(1, Ordering::Relaxed);
        } else {
            self.aborted_transactions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn snapshot(&self, collections: usize) -> StoreStats {
        StoreStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            transactions: self.transactions.load(Ordering::Relaxed),
            aborted_transactions: self.aborted_transactions.load(Ordering::Relaxed),
            collections,
        }
    }
}
