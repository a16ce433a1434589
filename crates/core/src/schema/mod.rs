//! Schema module for Flowdex.
//!
//! This module contains the record schema definitions that filters and
//! sorts are validated against.

mod field;
mod record;

pub use field::FieldDef;
pub use record::{RecordSchema, RecordSchemaBuilder};
