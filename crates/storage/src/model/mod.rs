//! Domain records held by the index caches.
//!
//! Each record is a serde type (stored as one document per key) and a
//! [`Record`](flowdex_query::executor::Record) with a static field table
//! naming its queryable attributes. Timestamps are carried as
//! `DateTime<Utc>` and serialized as epoch milliseconds.

mod job;
mod json_tree;
mod process_id;
mod process_instance;
mod user_task;

pub use job::Job;
pub use process_id::ProcessIdMapping;
pub use process_instance::{NodeInstance, ProcessInstance, ProcessInstanceError};
pub use user_task::UserTaskInstance;

use chrono::{DateTime, Utc};
use flowdex_core::Value;
use std::collections::BTreeSet;

/// Reads an optional string attribute.
#[inline]
pub(crate) fn text(value: &Option<String>) -> Value {
    Value::from(value.as_deref())
}

/// Reads an optional timestamp attribute.
#[inline]
pub(crate) fn timestamp(value: &Option<DateTime<Utc>>) -> Value {
    Value::from(*value)
}

/// Reads a string-set attribute.
#[inline]
pub(crate) fn string_set(values: &BTreeSet<String>) -> Value {
    Value::string_list(values)
}
