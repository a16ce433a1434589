//! Sort executor.

use super::field_table::FieldTable;
use crate::ast::SortDirection;
use crate::binder::BoundSort;
use flowdex_core::Value;
use std::borrow::Borrow;
use std::cmp::Ordering;

/// Sort executor - stable multi-key sort over bound sort criteria.
///
/// Null sorts lowest: first in ascending order, last in descending order.
/// Records that compare equal on every key keep their input order.
pub struct SortExecutor<'a, V> {
    table: &'a FieldTable<V>,
    order_by: &'a [BoundSort],
}

impl<'a, V> SortExecutor<'a, V> {
    /// Creates a new sort executor.
    pub fn new(table: &'a FieldTable<V>, order_by: &'a [BoundSort]) -> Self {
        Self { table, order_by }
    }

    /// Executes the sort on the input records.
    pub fn execute<T: Borrow<V>>(&self, input: Vec<T>) -> Vec<T> {
        if self.order_by.is_empty() {
            return input;
        }
        // Extract keys once instead of on every comparison.
        let mut keyed: Vec<(Vec<Value>, T)> = input
            .into_iter()
            .map(|r| {
                let keys = self
                    .order_by
                    .iter()
                    .map(|s| self.table.extract(&s.field, r.borrow()))
                    .collect();
                (keys, r)
            })
            .collect();
        keyed.sort_by(|(a, _), (b, _)| self.compare_keys(a, b));
        keyed.into_iter().map(|(_, r)| r).collect()
    }

    fn compare_keys(&self, a: &[Value], b: &[Value]) -> Ordering {
        for ((av, bv), sort) in a.iter().zip(b).zip(self.order_by) {
            let cmp = av.cmp(bv);
            if cmp != Ordering::Equal {
                return match sort.direction {
                    SortDirection::Asc => cmp,
                    SortDirection::Desc => cmp.reverse(),
                };
            }
        }
        Ordering::Equal
    }
}
