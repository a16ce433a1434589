//! Query runner - filter, sort and paginate a snapshot of records.

use super::field_table::{FieldTable, Record};
use super::filter::FilterExecutor;
use super::limit::LimitExecutor;
use super::sort::SortExecutor;
use crate::ast::QueryRequest;
use crate::binder::{bind_request, BoundQuery};
use flowdex_core::Result;
use std::borrow::Borrow;
use tracing::trace;

/// Evaluates query requests in process against a record snapshot.
///
/// The pipeline is fixed: filter, then stable sort, then offset/limit.
pub struct QueryRunner<'a, V> {
    table: &'a FieldTable<V>,
}

impl<V: Record> QueryRunner<'static, V> {
    /// Creates a runner over the record type's own field table.
    pub fn for_record() -> Self {
        Self::new(V::field_table())
    }
}

impl<'a, V> QueryRunner<'a, V> {
    /// Creates a new runner over a field table.
    pub fn new(table: &'a FieldTable<V>) -> Self {
        Self { table }
    }

    /// Binds and evaluates a request.
    ///
    /// Fails with `FieldNotFound` or `TypeMismatch` before any record is
    /// looked at.
    pub fn run<T: Borrow<V>>(&self, snapshot: Vec<T>, request: &QueryRequest) -> Result<Vec<T>> {
        let bound = bind_request(request, self.table.schema())?;
        Ok(self.run_bound(snapshot, &bound))
    }

    /// Evaluates an already bound request.
    pub fn run_bound<T: Borrow<V>>(&self, snapshot: Vec<T>, query: &BoundQuery) -> Vec<T> {
        if query.limit == Some(0) {
            return Vec::new();
        }
        let scanned = snapshot.len();
        let filtered = match &query.filter {
            Some(filter) => FilterExecutor::new(self.table, filter).execute(snapshot),
            None => snapshot,
        };
        let matched = filtered.len();
        let sorted = SortExecutor::new(self.table, &query.sorts).execute(filtered);
        let page = LimitExecutor::new(query.offset, query.limit).execute(sorted);
        trace!(
            record = self.table.schema().name(),
            scanned,
            matched,
            returned = page.len(),
            "evaluated query in memory"
        );
        page
    }
}
