//! Cache backed by a document store collection.

use super::Cache;
use flowdex_core::Result;
use flowdex_document::translate::translate;
use flowdex_document::{DocumentCodec, DocumentStore};
use flowdex_query::ast::QueryRequest;
use flowdex_query::executor::Record;
use flowdex_query::QueryEngine;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// A cache persisted as one collection of a [`DocumentStore`].
///
/// Values are stored as documents keyed by `_id`; queries are translated
/// to native filter and sort documents and run by the store.
pub struct DocumentCache<V> {
    name: String,
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> V>,
}

impl<V: Record + DocumentCodec> DocumentCache<V> {
    /// Binds a cache to the named collection.
    ///
    /// Fails with `DuplicateCache` when the store already serves that
    /// collection to another cache.
    pub fn new(name: impl Into<String>, store: Arc<dyn DocumentStore>) -> Result<Self> {
        let name = name.into();
        store.register_collection(&name)?;
        debug!(cache = %name, "bound document cache");
        Ok(Self {
            name,
            store,
            _marker: PhantomData,
        })
    }

    /// Binds a cache to the collection named after the record type.
    pub fn for_record(store: Arc<dyn DocumentStore>) -> Result<Self> {
        Self::new(V::field_table().schema().name(), store)
    }

    fn logged<T>(&self, op: &'static str, result: Result<T>) -> Result<T> {
        result.inspect_err(|e| warn!(cache = %self.name, op, error = %e, "document cache failure"))
    }
}

impl<V: Record + DocumentCodec> QueryEngine<V> for DocumentCache<V> {
    fn query(&self, request: &QueryRequest) -> Result<Vec<V>> {
        let native = translate(request, V::field_table().schema())?;
        if native.limit == Some(0) {
            return Ok(Vec::new());
        }
        let documents = self.logged("query", self.store.find(&self.name, &native))?;
        debug!(cache = %self.name, query = %native, returned = documents.len(), "document query");
        documents.into_iter().map(V::decode).collect()
    }
}

impl<V: Record + DocumentCodec> Cache<V> for DocumentCache<V> {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, key: &str, value: V) -> Result<()> {
        let document = value.encode(key)?;
        self.logged("put", self.store.upsert(&self.name, key, document))?;
        debug!(cache = %self.name, key, "put");
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<V>> {
        self.logged("get", self.store.find_one(&self.name, key))?
            .map(V::decode)
            .transpose()
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.logged("remove", self.store.delete(&self.name, key))
    }

    fn clear(&self) -> Result<()> {
        self.logged("clear", self.store.delete_all(&self.name))?;
        debug!(cache = %self.name, "cleared");
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        let count = self.logged("len", self.store.count(&self.name))?;
        Ok(usize::try_from(count).unwrap_or(usize::MAX))
    }
}

impl<V> std::fmt::Debug for DocumentCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentCache")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
