//! Storage layer for collstore
//!
//! This crate implements the concurrent collection store:
//! - CollectionStore: DashMap of collections, one mutex per collection
//! - Per-collection monotonic id counters (never reused)
//! - Exact-match field scans and filtered/sorted/paginated queries
//! - Single-collection copy-on-write transactions
//! - Operation counters
//!
//! # Concurrency
//!
//! - Every operation on a collection, reads included, holds that
//!   collection's lock for the duration of its critical section
//! - Different collections never contend
//! - Critical sections do no I/O and never suspend, so async tasks may call
//!   the store directly

#![warn(missing_docs)]
#![warn(clippy::all)]

mod collection;
pub mod query;
pub mod stats;
pub mod store;
pub mod transaction;

pub use query::{Query, SortOrder};
pub use stats::StoreStats;
pub use store::CollectionStore;
pub use transaction::CollectionTxn;
