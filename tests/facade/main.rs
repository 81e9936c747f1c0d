//! Facade Integration Tests
//!
//! Exercises the public `collstore` API the way a web backend uses it:
//! request handlers over the store, list caching with invalidation,
//! memoized lookups, and configuration/logging at startup.

mod handlers;
mod memoized;
mod startup;
