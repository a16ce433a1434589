//! Document-store driver boundary.

mod embedded;
pub mod journal;
mod matcher;

pub use embedded::EmbeddedDocumentStore;
pub use journal::{Journal, JournalEntry};
pub use matcher::{Matcher, SortSpec};

use crate::translate::NativeQuery;
use bson::Document;
use flowdex_core::Result;

/// A document database holding one collection per domain type.
///
/// Documents are keyed by their `_id`. Every failure to reach or operate
/// the backend surfaces as `StorageUnavailable`.
pub trait DocumentStore: Send + Sync {
    /// Claims a collection for one cache.
    ///
    /// Stores that track ownership fail with `DuplicateCache` when the
    /// collection is already claimed.
    fn register_collection(&self, _collection: &str) -> Result<()> {
        Ok(())
    }

    /// Inserts or replaces the document stored under `key`.
    fn upsert(&self, collection: &str, key: &str, document: Document) -> Result<()>;

    fn find_one(&self, collection: &str, key: &str) -> Result<Option<Document>>;

    /// Deletes the document stored under `key`; absent keys are not an error.
    fn delete(&self, collection: &str, key: &str) -> Result<()>;

    fn delete_all(&self, collection: &str) -> Result<()>;

    fn count(&self, collection: &str) -> Result<u64>;

    /// Runs a translated query and returns the matching documents in order.
    fn find(&self, collection: &str, query: &NativeQuery) -> Result<Vec<Document>>;
}
