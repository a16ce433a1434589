//! Embedded, optionally journaled, document store.

use super::journal::{Journal, JournalEntry};
use super::matcher::{Matcher, SortSpec};
use super::DocumentStore;
use crate::codec::ID_FIELD;
use crate::translate::NativeQuery;
use bson::Document;
use flowdex_core::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use std::path::Path;
use tracing::{debug, info, warn};

type Collection = IndexMap<String, Document>;

#[derive(Debug, Default)]
struct StoreState {
    /// Collection name → documents in insertion order.
    collections: IndexMap<String, Collection>,
    /// Collections claimed by a cache.
    registered: IndexSet<String>,
    journal: Option<Journal>,
    closed: bool,
}

impl StoreState {
    fn apply(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::Upsert {
                collection,
                key,
                document,
            } => {
                // Replacing keeps the original insertion position.
                self.collections
                    .entry(collection)
                    .or_default()
                    .insert(key, document);
            }
            JournalEntry::Delete { collection, key } => {
                if let Some(docs) = self.collections.get_mut(&collection) {
                    docs.shift_remove(&key);
                }
            }
            JournalEntry::Clear { collection } => {
                if let Some(docs) = self.collections.get_mut(&collection) {
                    docs.clear();
                }
            }
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::storage_unavailable("document store is closed"));
        }
        Ok(())
    }

    /// Journals the entry, then applies it.
    ///
    /// Clearing a collection also compacts the journal.
    fn write(&mut self, entry: JournalEntry) -> Result<()> {
        self.check_open()?;
        let compact = matches!(entry, JournalEntry::Clear { .. });
        if let Some(journal) = self.journal.as_mut() {
            journal.append(&entry)?;
        }
        self.apply(entry);
        if compact {
            self.compact_journal();
        }
        Ok(())
    }

    fn compact_journal(&mut self) {
        let Some(journal) = self.journal.as_mut() else {
            return;
        };
        let live = self.collections.iter().flat_map(|(collection, docs)| {
            docs.iter().map(move |(key, document)| JournalEntry::Upsert {
                collection: collection.clone(),
                key: key.clone(),
                document: document.clone(),
            })
        });
        // The clear is already journaled; a failed rewrite keeps the old file.
        if let Err(e) = journal.compact(live) {
            warn!(error = %e, "journal compaction failed");
        }
    }
}

/// A process-embedded document database.
///
/// Collections keep documents in natural (insertion) order and answer
/// translated queries with a MongoDB-compatible matcher and a stable sort.
/// Opened on a data directory, every mutation is journaled and the
/// journal is replayed on the next open.
#[derive(Debug, Default)]
pub struct EmbeddedDocumentStore {
    state: RwLock<StoreState>,
}

impl EmbeddedDocumentStore {
    /// Creates a store that lives only in memory.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a journaled store in `data_dir`, replaying earlier mutations.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self> {
        let (journal, entries) = Journal::open(data_dir.as_ref())?;
        let mut state = StoreState::default();
        let replayed = entries.len();
        for entry in entries {
            state.apply(entry);
        }
        info!(
            path = %journal.path().display(),
            replayed,
            collections = state.collections.len(),
            "opened document store"
        );
        state.journal = Some(journal);
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Closes the store; every later operation fails with `StorageUnavailable`.
    pub fn close(&self) {
        let mut state = self.state.write();
        state.closed = true;
        state.journal = None;
    }

    pub fn is_closed(&self) -> bool {
        self.state.read().closed
    }

    /// Returns the names of collections holding or having held documents.
    pub fn collection_names(&self) -> Vec<String> {
        self.state.read().collections.keys().cloned().collect()
    }
}

impl DocumentStore for EmbeddedDocumentStore {
    fn register_collection(&self, collection: &str) -> Result<()> {
        let mut state = self.state.write();
        state.check_open()?;
        if !state.registered.insert(collection.to_string()) {
            return Err(Error::duplicate_cache(collection));
        }
        state.collections.entry(collection.to_string()).or_default();
        Ok(())
    }

    fn upsert(&self, collection: &str, key: &str, mut document: Document) -> Result<()> {
        match document.get_str(ID_FIELD) {
            Ok(id) if id == key => {}
            Ok(id) => {
                return Err(Error::storage_unavailable(format!(
                    "document `_id` {} does not match key {}",
                    id, key
                )))
            }
            Err(_) => {
                document.insert(ID_FIELD, key);
            }
        }
        self.state.write().write(JournalEntry::Upsert {
            collection: collection.to_string(),
            key: key.to_string(),
            document,
        })
    }

    fn find_one(&self, collection: &str, key: &str) -> Result<Option<Document>> {
        let state = self.state.read();
        state.check_open()?;
        Ok(state
            .collections
            .get(collection)
            .and_then(|docs| docs.get(key))
            .cloned())
    }

    fn delete(&self, collection: &str, key: &str) -> Result<()> {
        let mut state = self.state.write();
        let present = state
            .collections
            .get(collection)
            .is_some_and(|docs| docs.contains_key(key));
        if !present {
            return state.check_open();
        }
        state.write(JournalEntry::Delete {
            collection: collection.to_string(),
            key: key.to_string(),
        })
    }

    fn delete_all(&self, collection: &str) -> Result<()> {
        let mut state = self.state.write();
        let empty = state
            .collections
            .get(collection)
            .map_or(true, IndexMap::is_empty);
        if empty {
            return state.check_open();
        }
        state.write(JournalEntry::Clear {
            collection: collection.to_string(),
        })
    }

    fn count(&self, collection: &str) -> Result<u64> {
        let state = self.state.read();
        state.check_open()?;
        Ok(state.collections.get(collection).map_or(0, |docs| docs.len() as u64))
    }

    fn find(&self, collection: &str, query: &NativeQuery) -> Result<Vec<Document>> {
        let matcher = Matcher::compile(&query.filter)?;
        let sort = SortSpec::compile(&query.sort)?;
        if query.limit == Some(0) {
            return Ok(Vec::new());
        }

        let state = self.state.read();
        state.check_open()?;
        let Some(docs) = state.collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut matched: Vec<&Document> = docs.values().filter(|d| matcher.matches(d)).collect();
        let total = matched.len();
        sort.sort(&mut matched);

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        let page: Vec<Document> = matched.into_iter().skip(skip).take(limit).cloned().collect();
        debug!(collection, matched = total, returned = page.len(), "embedded find");
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::journal::JOURNAL_FILE;
    use bson::doc;

    fn store_with_jobs() -> EmbeddedDocumentStore {
        let store = EmbeddedDocumentStore::in_memory();
        store.register_collection("jobs").unwrap();
        store.upsert("jobs", "b", doc! { "_id": "b", "priority": 2 }).unwrap();
        store.upsert("jobs", "a", doc! { "_id": "a", "priority": 1 }).unwrap();
        store.upsert("jobs", "c", doc! { "priority": 2 }).unwrap();
        store
    }

    fn ids(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|d| d.get_str(ID_FIELD).unwrap()).collect()
    }

    #[test]
    fn test_natural_order_and_upsert_position() {
        let store = store_with_jobs();
        store.upsert("jobs", "b", doc! { "_id": "b", "priority": 3 }).unwrap();
        let all = store.find("jobs", &NativeQuery::default()).unwrap();
        assert_eq!(ids(&all), vec!["b", "a", "c"]);
        assert_eq!(all[0].get_i32("priority").unwrap(), 3);
        assert_eq!(store.count("jobs").unwrap(), 3);
    }

    #[test]
    fn test_find_filter_sort_page() {
        let store = store_with_jobs();
        let query = NativeQuery {
            filter: doc! { "priority": { "$gte": 1 } },
            sort: doc! { "priority": -1 },
            skip: 1,
            limit: Some(1),
        };
        // b and c tie on priority and keep insertion order
        assert_eq!(ids(&store.find("jobs", &query).unwrap()), vec!["c"]);
    }

    #[test]
    fn test_delete_and_clear() {
        let store = store_with_jobs();
        store.delete("jobs", "a").unwrap();
        store.delete("jobs", "missing").unwrap();
        assert_eq!(store.find_one("jobs", "a").unwrap(), None);
        store.delete_all("jobs").unwrap();
        store.delete_all("jobs").unwrap();
        assert_eq!(store.count("jobs").unwrap(), 0);
    }

    #[test]
    fn test_duplicate_registration() {
        let store = store_with_jobs();
        let err = store.register_collection("jobs").unwrap_err();
        assert!(matches!(err, Error::DuplicateCache { .. }));
    }

    #[test]
    fn test_mismatched_id_rejected() {
        let store = EmbeddedDocumentStore::in_memory();
        assert!(store.upsert("jobs", "a", doc! { "_id": "b" }).is_err());
    }

    #[test]
    fn test_closed_store_is_unavailable() {
        let store = store_with_jobs();
        store.close();
        assert!(store.is_closed());
        for result in [
            store.count("jobs").map(|_| ()),
            store.find("jobs", &NativeQuery::default()).map(|_| ()),
            store.upsert("jobs", "d", doc! {}),
            store.delete("jobs", "missing"),
            store.delete_all("jobs"),
        ] {
            assert!(matches!(result, Err(Error::StorageUnavailable { .. })));
        }
    }

    #[test]
    fn test_reopen_replays_journal() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = EmbeddedDocumentStore::open(dir.path()).unwrap();
            store.upsert("jobs", "a", doc! { "_id": "a", "priority": 1 }).unwrap();
            store.upsert("jobs", "b", doc! { "_id": "b", "priority": 2 }).unwrap();
            store.upsert("jobs", "a", doc! { "_id": "a", "priority": 5 }).unwrap();
            store.delete("jobs", "b").unwrap();
            store.upsert("tasks", "t", doc! { "_id": "t" }).unwrap();
            store.delete_all("tasks").unwrap();
        }
        let store = EmbeddedDocumentStore::open(dir.path()).unwrap();
        let all = store.find("jobs", &NativeQuery::default()).unwrap();
        assert_eq!(ids(&all), vec!["a"]);
        assert_eq!(all[0].get_i32("priority").unwrap(), 5);
        assert_eq!(store.count("tasks").unwrap(), 0);
        // registrations are per process, not journaled
        store.register_collection("jobs").unwrap();
    }

    #[test]
    fn test_clear_compacts_journal() {
        let dir = tempfile::tempdir().unwrap();
        let journal = dir.path().join(JOURNAL_FILE);
        {
            let store = EmbeddedDocumentStore::open(dir.path()).unwrap();
            for key in ["a", "b", "c"] {
                store.upsert("jobs", key, doc! { "_id": key, "priority": 1 }).unwrap();
            }
            store.upsert("tasks", "t", doc! { "_id": "t" }).unwrap();
            let before = std::fs::metadata(&journal).unwrap().len();
            store.delete_all("jobs").unwrap();
            assert!(std::fs::metadata(&journal).unwrap().len() < before);
            store.upsert("jobs", "d", doc! { "_id": "d", "priority": 2 }).unwrap();
        }
        let store = EmbeddedDocumentStore::open(dir.path()).unwrap();
        assert_eq!(ids(&store.find("jobs", &NativeQuery::default()).unwrap()), vec!["d"]);
        assert_eq!(store.count("tasks").unwrap(), 1);
    }

    #[test]
    fn test_second_open_on_same_dir_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let store = EmbeddedDocumentStore::open(dir.path()).unwrap();
        let err = EmbeddedDocumentStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
        store.close();
        assert!(EmbeddedDocumentStore::open(dir.path()).is_ok());
    }
}
