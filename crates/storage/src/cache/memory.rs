//! In-memory cache.

use super::Cache;
use flowdex_core::Result;
use flowdex_query::ast::QueryRequest;
use flowdex_query::executor::{QueryRunner, Record};
use flowdex_query::QueryEngine;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// A cache held in process memory.
///
/// Entries keep insertion order, which is the natural order of query
/// results; replacing a value keeps its position.
pub struct InMemoryCache<V> {
    name: String,
    entries: RwLock<IndexMap<String, Arc<V>>>,
}

impl<V: Record> InMemoryCache<V> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(IndexMap::new()),
        }
    }

    /// Creates a cache named after the record type.
    pub fn for_record() -> Self {
        Self::new(V::field_table().schema().name())
    }

    fn snapshot(&self) -> Vec<Arc<V>> {
        self.entries.read().values().cloned().collect()
    }
}

impl<V: Record> QueryEngine<V> for InMemoryCache<V> {
    fn query(&self, request: &QueryRequest) -> Result<Vec<V>> {
        let runner = QueryRunner::<V>::for_record();
        let page = runner.run(self.snapshot(), request)?;
        debug!(cache = %self.name, returned = page.len(), "in-memory query");
        Ok(page.into_iter().map(|v| V::clone(&v)).collect())
    }
}

impl<V: Record> Cache<V> for InMemoryCache<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, key: &str, value: V) -> Result<()> {
        self.entries.write().insert(key.to_string(), Arc::new(value));
        debug!(cache = %self.name, key, "put");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(self.entries.read().get(key).map(|v| V::clone(v)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.entries.write().shift_remove(key).is_some() {
            debug!(cache = %self.name, key, "removed");
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.entries.write().clear();
        debug!(cache = %self.name, "cleared");
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.read().len())
    }
}

impl<V> std::fmt::Debug for InMemoryCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("name", &self.name)
            .field("len", &self.entries.read().len())
            .finish()
    }
}
