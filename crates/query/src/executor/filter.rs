//! Filter executor.

use super::field_table::FieldTable;
use crate::binder::{BoundFilter, BoundLeaf, Predicate};
use flowdex_core::pattern_match;
use flowdex_core::Value;
use std::borrow::Borrow;
use std::slice;

/// Filter executor - retains the records a bound filter tree accepts.
pub struct FilterExecutor<'a, V> {
    table: &'a FieldTable<V>,
    filter: &'a BoundFilter,
}

impl<'a, V> FilterExecutor<'a, V> {
    /// Creates a new filter executor.
    pub fn new(table: &'a FieldTable<V>, filter: &'a BoundFilter) -> Self {
        Self { table, filter }
    }

    /// Evaluates the tree against one record.
    pub fn eval(&self, record: &V) -> bool {
        self.eval_node(self.filter, record)
    }

    /// Executes the filter, preserving input order.
    pub fn execute<T: Borrow<V>>(&self, input: Vec<T>) -> Vec<T> {
        input
            .into_iter()
            .filter(|r| self.eval(r.borrow()))
            .collect()
    }

    fn eval_node(&self, node: &BoundFilter, record: &V) -> bool {
        match node {
            BoundFilter::Leaf(leaf) => eval_leaf(leaf, &self.table.extract(&leaf.field, record)),
            BoundFilter::And(children) => children.iter().all(|c| self.eval_node(c, record)),
            BoundFilter::Or(children) => children.iter().any(|c| self.eval_node(c, record)),
        }
    }
}

/// Evaluates a bound leaf against an extracted field value.
///
/// A null value fails every test except `isNull`.
pub fn eval_leaf(leaf: &BoundLeaf, value: &Value) -> bool {
    match &leaf.predicate {
        Predicate::Compare(op, operand) => value.compare(operand).is_some_and(|o| op.test(o)),
        Predicate::Between(lo, hi) => {
            value.compare(lo).is_some_and(|o| o.is_ge()) && value.compare(hi).is_some_and(|o| o.is_le())
        }
        Predicate::In(set) => set.iter().any(|s| value.matches(s)),
        Predicate::IsNull => value.is_null(),
        Predicate::NotNull => !value.is_null(),
        Predicate::Substring(needle) => value.as_str().is_some_and(|s| s.contains(needle.as_str())),
        Predicate::HasElement(x) => elements(value).iter().any(|e| e.matches(x)),
        Predicate::ContainsAny(set) => elements(value)
            .iter()
            .any(|e| set.iter().any(|s| e.matches(s))),
        Predicate::ContainsAll(set) => {
            let elems = elements(value);
            set.iter().all(|s| elems.iter().any(|e| e.matches(s)))
        }
        Predicate::Like(pattern) => value
            .as_str()
            .is_some_and(|s| pattern_match::like(s, pattern)),
    }
}

/// Views a field value as a set of elements; a scalar is a one-element set.
fn elements(value: &Value) -> &[Value] {
    match value {
        Value::Null => &[],
        Value::List(items) => items,
        scalar => slice::from_ref(scalar),
    }
}
