//! Flowdex Storage - Typed caches and the cache registry.
//!
//! This crate provides:
//!
//! - `model`: the indexed domain records (process instances, user tasks,
//!   jobs, process id mappings) and their field tables
//! - `Cache`: the typed key-value cache contract, with `InMemoryCache`
//!   and `DocumentCache` implementations
//! - `CacheService`: one cache per domain collection plus `DefinitionCache`
//! - `ServiceConfig`: backend selection, loadable from TOML
//!
//! # Example
//!
//! ```rust
//! use flowdex_query::ast::builder::{equal_to, is_null};
//! use flowdex_query::ast::QueryRequest;
//! use flowdex_storage::model::Job;
//! use flowdex_storage::{Cache, CacheService, QueryEngine, ServiceConfig};
//!
//! let service = CacheService::new(&ServiceConfig::from_toml_str(r#"backend = "document""#).unwrap()).unwrap();
//! let jobs = service.jobs();
//! jobs.put("job1", Job { id: "job1".into(), status: Some("SCHEDULED".into()), ..Job::default() }).unwrap();
//! jobs.put("job2", Job { id: "job2".into(), status: Some("EXECUTED".into()), ..Job::default() }).unwrap();
//!
//! let request = QueryRequest::filtered(vec![equal_to("status", "SCHEDULED"), is_null("rootProcessInstanceId")]);
//! let found = jobs.query(&request).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].id, "job1");
//! ```

pub mod cache;
mod config;
pub mod model;
mod service;

pub use cache::{Cache, DocumentCache, InMemoryCache};
pub use config::{Backend, ServiceConfig};
pub use flowdex_query::QueryEngine;
pub use service::{CacheService, DefinitionCache};
