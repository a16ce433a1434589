//! The cache registry.
//!
//! This module provides [`CacheService`], which owns one typed cache per
//! domain collection, and [`DefinitionCache`] for definition blobs.

use crate::cache::{Cache, DocumentCache, InMemoryCache};
use crate::config::{Backend, ServiceConfig};
use crate::model::{Job, ProcessIdMapping, ProcessInstance, UserTaskInstance};
use dashmap::DashMap;
use flowdex_core::Result;
use flowdex_document::{DocumentStore, EmbeddedDocumentStore};
use std::sync::Arc;
use tracing::info;

/// Plain concurrent map of definition name to serialized definition.
#[derive(Debug, Default)]
pub struct DefinitionCache {
    entries: DashMap<String, String>,
}

impl DefinitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    /// Stores a definition, returning the one it replaced.
    pub fn put(&self, key: impl Into<String>, definition: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), definition.into())
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.remove(key).map(|(_, v)| v)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns all definition names.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }
}

/// Registry of the index caches.
///
/// Built once at process start and passed by reference; the set of caches
/// never changes afterwards, only their contents.
pub struct CacheService {
    backend: Backend,
    process_instances: Box<dyn Cache<ProcessInstance>>,
    user_task_instances: Box<dyn Cache<UserTaskInstance>>,
    jobs: Box<dyn Cache<Job>>,
    process_id_model: Box<dyn Cache<ProcessIdMapping>>,
    definitions: DefinitionCache,
}

impl CacheService {
    /// Builds the registry described by `config`.
    ///
    /// The document backend opens an embedded store, journaled in
    /// `data_dir` when one is configured.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;
        let service = match config.backend {
            Backend::Memory => Self::in_memory(),
            Backend::Document => {
                let store = match &config.data_dir {
                    Some(dir) => EmbeddedDocumentStore::open(dir)?,
                    None => EmbeddedDocumentStore::in_memory(),
                };
                Self::with_document_store(Arc::new(store))?
            }
        };
        info!(backend = ?service.backend, "cache service ready");
        Ok(service)
    }

    /// Creates a registry of in-memory caches.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory,
            process_instances: Box::new(InMemoryCache::<ProcessInstance>::for_record()),
            user_task_instances: Box::new(InMemoryCache::<UserTaskInstance>::for_record()),
            jobs: Box::new(InMemoryCache::<Job>::for_record()),
            process_id_model: Box::new(InMemoryCache::<ProcessIdMapping>::for_record()),
            definitions: DefinitionCache::new(),
        }
    }

    /// Creates a registry whose caches are collections of `store`.
    ///
    /// Fails with `DuplicateCache` if another registry already bound the
    /// same store.
    pub fn with_document_store(store: Arc<dyn DocumentStore>) -> Result<Self> {
        Ok(Self {
            backend: Backend::Document,
            process_instances: Box::new(DocumentCache::<ProcessInstance>::for_record(
                store.clone(),
            )?),
            user_task_instances: Box::new(DocumentCache::<UserTaskInstance>::for_record(
                store.clone(),
            )?),
            jobs: Box::new(DocumentCache::<Job>::for_record(store.clone())?),
            process_id_model: Box::new(DocumentCache::<ProcessIdMapping>::for_record(store)?),
            definitions: DefinitionCache::new(),
        })
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn process_instances(&self) -> &dyn Cache<ProcessInstance> {
        self.process_instances.as_ref()
    }

    pub fn user_task_instances(&self) -> &dyn Cache<UserTaskInstance> {
        self.user_task_instances.as_ref()
    }

    pub fn jobs(&self) -> &dyn Cache<Job> {
        self.jobs.as_ref()
    }

    /// Returns the process id → model type name cache.
    pub fn process_id_model(&self) -> &dyn Cache<ProcessIdMapping> {
        self.process_id_model.as_ref()
    }

    pub fn definitions(&self) -> &DefinitionCache {
        &self.definitions
    }

    /// Returns the names of the typed caches.
    pub fn cache_names(&self) -> [&str; 4] {
        [
            self.process_instances.name(),
            self.user_task_instances.name(),
            self.jobs.name(),
            self.process_id_model.name(),
        ]
    }

    /// Clears every cache.
    pub fn clear_all(&self) -> Result<()> {
        self.process_instances.clear()?;
        self.user_task_instances.clear()?;
        self.jobs.clear()?;
        self.process_id_model.clear()?;
        self.definitions.clear();
        info!("cleared all caches");
        Ok(())
    }
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("backend", &self.backend)
            .field("caches", &self.cache_names())
            .field("definitions", &self.definitions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdex_core::Error;

    #[test]
    fn test_definition_cache() {
        let definitions = DefinitionCache::new();
        assert!(definitions.is_empty());
        assert_eq!(definitions.put("travels.proto", "message A {}"), None);
        assert_eq!(
            definitions.put("travels.proto", "message B {}"),
            Some("message A {}".to_string())
        );
        assert_eq!(definitions.get("travels.proto").as_deref(), Some("message B {}"));
        assert_eq!(definitions.keys(), vec!["travels.proto".to_string()]);
        assert_eq!(definitions.remove("missing"), None);
        definitions.clear();
        assert!(definitions.is_empty());
    }

    #[test]
    fn test_cache_names() {
        let service = CacheService::in_memory();
        assert_eq!(
            service.cache_names(),
            ["processinstances", "usertaskinstances", "jobs", "processidmodel"]
        );
    }

    #[test]
    fn test_clear_all() {
        let service = CacheService::new(&ServiceConfig::document(None)).unwrap();
        service.jobs().put("j", Job::default()).unwrap();
        service
            .process_id_model()
            .put("travels", ProcessIdMapping::new("travels", "org.acme.Travels"))
            .unwrap();
        service.definitions().put("a", "b");
        service.clear_all().unwrap();
        service.clear_all().unwrap();
        assert!(service.jobs().is_empty().unwrap());
        assert!(service.process_id_model().is_empty().unwrap());
        assert!(service.definitions().is_empty());
    }

    #[test]
    fn test_store_binds_once() {
        let store: Arc<dyn DocumentStore> = Arc::new(EmbeddedDocumentStore::in_memory());
        let _service = CacheService::with_document_store(store.clone()).unwrap();
        let err = CacheService::with_document_store(store).unwrap_err();
        assert!(matches!(err, Error::DuplicateCache { .. }));
    }
}
