//! Flowdex Core - Core types and record schemas for the Flowdex process index.
//!
//! This crate provides the foundational types shared by both query evaluators:
//!
//! - `DataType` / `Shape`: element types and scalar-vs-collection field shapes
//! - `Value`: runtime field values and filter operands
//! - `schema`: record schemas (`RecordSchema`, `FieldDef`)
//! - `pattern_match`: the `like` wildcard language
//! - `Error`: the error taxonomy for cache, query and storage operations
//!
//! # Example
//!
//! ```rust
//! use flowdex_core::{DataType, Value};
//! use flowdex_core::schema::RecordSchemaBuilder;
//!
//! let schema = RecordSchemaBuilder::new("jobs")
//!     .unwrap()
//!     .add_scalar("id", DataType::String)
//!     .unwrap()
//!     .add_scalar("priority", DataType::Int32)
//!     .unwrap()
//!     .add_collection("tags", DataType::String)
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! assert!(schema.resolve("tags").unwrap().is_collection());
//! assert!(DataType::Int32.accepts(&Value::Int64(3)));
//! ```

mod error;
pub mod pattern_match;
pub mod schema;
mod types;
mod value;

pub use error::{Error, Result};
pub use types::{DataType, Shape};
pub use value::Value;
