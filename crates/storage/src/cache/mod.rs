//! Named, typed key-value caches with query support.
//!
//! A cache holds one domain collection. [`InMemoryCache`] keeps values in
//! process and evaluates queries with the in-memory runner;
//! [`DocumentCache`] keeps them in a [`DocumentStore`] and translates
//! queries to native document queries. Both answer the same request with
//! the same ordered sequence.
//!
//! [`DocumentStore`]: flowdex_document::DocumentStore

mod document;
mod memory;

pub use document::DocumentCache;
pub use memory::InMemoryCache;

use flowdex_core::Result;
use flowdex_query::QueryEngine;

/// A named cache of `V` values keyed by string.
///
/// Writes are upserts and immediately visible to every thread. Queries
/// never mutate the cache.
pub trait Cache<V>: QueryEngine<V> + Send + Sync {
    /// Returns the cache (and collection) name.
    fn name(&self) -> &str;

    /// Inserts or replaces the value stored under `key`.
    fn put(&self, key: &str, value: V) -> Result<()>;

    /// Returns the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<V>>;

    /// Removes the value stored under `key`; absent keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Removes every value.
    fn clear(&self) -> Result<()>;

    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
