//! Filtered, sorted, paginated reads
//!
//! A [`Query`] is applied to a copy of a collection's records:
//! filters first (all must match), then the sort, then `skip`, then `limit`.
//!
//! ```ignore
//! use collstore_storage::{Query, SortOrder};
//!
//! let query = Query::new()
//!     .filter(|r| r.get("age").and_then(|v| v.as_int()).unwrap_or(0) > 25)
//!     .sort_by("name", SortOrder::Ascending)
//!     .limit(10);
//! let adults = store.query("users", &query)?;
//! ```

use collstore_core::{Record, Value};
use std::cmp::Ordering;
use std::fmt;

type Predicate = Box<dyn Fn(&Record) -> bool + Send + Sync>;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Smallest first; records missing the field come first
    #[default]
    Ascending,
    /// Largest first; records missing the field come last
    Descending,
}

/// Read options for [`crate::CollectionStore::query`]
#[derive(Default)]
pub struct Query {
    filters: Vec<Predicate>,
    sort: Option<(String, SortOrder)>,
    skip: usize,
    limit: Option<usize>,
}

impl Query {
    /// Query matching every record
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only records for which `predicate` returns true
    ///
    /// Multiple filters combine with AND.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Record) -> bool + Send + Sync + 'static,
    {
        self.filters.push(Box::new(predicate));
        self
    }

    /// Keep only records whose `field` equals `value`
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let field = field.into();
        let value = value.into();
        self.filter(move |record| record.get(&field).as_ref() == Some(&value))
    }

    /// Sort by a field using [`Value::sort_cmp`]
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }

    /// Skip the first `n` results
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    /// Return at most `n` results
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Run the query over `records`
    pub fn apply(&self, records: Vec<Record>) -> Vec<Record> {
        let mut results: Vec<Record> = records
            .into_iter()
            .filter(|record| self.filters.iter().all(|f| f(record)))
            .collect();

        if let Some((field, order)) = &self.sort {
            // Stable sort: ties keep ascending id order
            results.sort_by(|a, b| {
                let ord = compare_field(a.get(field), b.get(field));
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        let page = results.into_iter().skip(self.skip);
        match self.limit {
            Some(n) => page.take(n).collect(),
            None => page.collect(),
        }
    }
}

fn compare_field(a: Option<Value>, b: Option<Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.sort_cmp(&b),
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filters", &self.filters.len())
            .field("sort", &self.sort)
            .field("skip", &self.skip)
            .field("limit", &self.limit)
            .finish()
    }
}
