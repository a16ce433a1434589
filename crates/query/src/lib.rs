//! Flowdex Query - Filter expressions and the in-memory evaluator.
//!
//! This crate provides:
//!
//! - `ast`: filter expressions, builder functions and query requests
//! - `binder`: resolution of a request against a record schema
//! - `executor`: field tables and the filter, sort and limit executors
//! - `engine`: the `QueryEngine` capability implemented by every cache
//!
//! # Example
//!
//! ```rust
//! use flowdex_core::{DataType, Value};
//! use flowdex_query::ast::builder::{greater_than_equal, like};
//! use flowdex_query::ast::{QueryRequest, SortCriterion};
//! use flowdex_query::executor::{FieldTable, QueryRunner};
//!
//! struct Job {
//!     id: &'static str,
//!     priority: i32,
//! }
//!
//! let table = FieldTable::<Job>::builder("jobs")
//!     .scalar("id", DataType::String, |j| Value::from(j.id))
//!     .scalar("priority", DataType::Int32, |j| Value::from(j.priority))
//!     .build();
//!
//! let jobs = vec![
//!     Job { id: "a_job1", priority: 3 },
//!     Job { id: "b_job2", priority: 1 },
//! ];
//! let request = QueryRequest::filtered(vec![greater_than_equal("priority", 1), like("id", "*_job*")])
//!     .with_sort(SortCriterion::asc("priority"));
//!
//! let result = QueryRunner::new(&table).run(jobs, &request).unwrap();
//! assert_eq!(result[0].id, "b_job2");
//! ```

pub mod ast;
pub mod binder;
pub mod engine;
pub mod executor;

pub use engine::QueryEngine;
