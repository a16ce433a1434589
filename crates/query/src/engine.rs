//! The query capability shared by every cache backend.

use crate::ast::QueryRequest;
use crate::executor::{QueryRunner, Record};
use flowdex_core::Result;

/// Answers query requests over a collection of `V`.
///
/// The in-memory and document-backed caches both implement this, and are
/// expected to return the same ordered sequence for the same data.
pub trait QueryEngine<V> {
    /// Returns the matching values, filtered, sorted and paginated.
    fn query(&self, request: &QueryRequest) -> Result<Vec<V>>;
}

/// A plain vector is a query engine over its own elements in index order.
impl<V: Record> QueryEngine<V> for Vec<V> {
    fn query(&self, request: &QueryRequest) -> Result<Vec<V>> {
        let snapshot: Vec<&V> = self.iter().collect();
        Ok(QueryRunner::<V>::for_record()
            .run(snapshot, request)?
            .into_iter()
            .cloned()
            .collect())
    }
}
