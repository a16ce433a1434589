//! Flowdex Document - Persistent query translation and document storage.
//!
//! This crate provides:
//!
//! - `translate`: binds a `QueryRequest` and renders it as MongoDB-style
//!   filter, sort, skip and limit documents (`NativeQuery`)
//! - `store`: the `DocumentStore` driver trait and `EmbeddedDocumentStore`,
//!   an in-process store with an optional append-only journal
//! - `codec`: conversion between serde domain values and stored documents
//!
//! # Example
//!
//! ```rust
//! use bson::doc;
//! use flowdex_core::schema::RecordSchemaBuilder;
//! use flowdex_core::DataType;
//! use flowdex_document::store::{DocumentStore, EmbeddedDocumentStore};
//! use flowdex_document::translate::translate;
//! use flowdex_query::ast::builder::like;
//! use flowdex_query::ast::QueryRequest;
//!
//! let schema = RecordSchemaBuilder::new("jobs")
//!     .unwrap()
//!     .add_scalar("id", DataType::String)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let store = EmbeddedDocumentStore::in_memory();
//! store.upsert("jobs", "a", doc! { "_id": "a", "id": "4f1c_job1" }).unwrap();
//! store.upsert("jobs", "b", doc! { "_id": "b", "id": "4f1c_job2" }).unwrap();
//!
//! let query = translate(&QueryRequest::filtered(vec![like("id", "*_job1")]), &schema).unwrap();
//! assert_eq!(query.filter, doc! { "id": { "$regex": "\\A.*_job1\\z", "$options": "s" } });
//! assert_eq!(store.find("jobs", &query).unwrap().len(), 1);
//! ```

pub mod codec;
pub mod store;
pub mod translate;

pub use codec::DocumentCodec;
pub use store::{DocumentStore, EmbeddedDocumentStore};
pub use translate::NativeQuery;
