//! Translation of query requests into document-store queries.
//!
//! The output uses MongoDB query grammar. Each operator maps to the store
//! operator with the same meaning under the conventions every stored
//! document follows: absent attributes are stored as explicit nulls,
//! collections as arrays without null elements, timestamps as integer
//! epoch milliseconds.
//!
//! | Operator | Document filter |
//! |---|---|
//! | `equalTo` / `greaterThan` / ... | `$eq` / `$gt` / `$gte` / `$lt` / `$lte` |
//! | `between(lo, hi)` | `{$gte: lo, $lte: hi}` |
//! | `in`, `containsAny` | `$in` |
//! | `containsAll` | `$all` |
//! | `isNull` / `notNull` | `{$eq: null}` / `{$ne: null}` |
//! | `contains` on a string | unanchored escaped `$regex` |
//! | `contains` on a collection | `{$elemMatch: {$eq: v}}` |
//! | `like` | `$regex` anchored with `\A` and `\z`, `*` as `.*`, option `s` |
//!
//! `^` and `$` are avoided as anchors: under PCRE `$` also matches before a
//! trailing newline.

use crate::codec::value_to_bson;
use bson::{doc, Bson, Document};
use flowdex_core::pattern_match::wildcard_segments;
use flowdex_core::schema::RecordSchema;
use flowdex_core::Result;
use flowdex_query::ast::{QueryRequest, SortDirection};
use flowdex_query::binder::{bind_request, BoundFilter, BoundLeaf, BoundQuery, BoundSort, CompareOp, Predicate};
use std::fmt;

/// A translated query, ready for a `DocumentStore`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NativeQuery {
    /// Filter document; empty matches everything.
    pub filter: Document,
    /// Ordered sort specification, `{path: 1 | -1}`.
    pub sort: Document,
    pub skip: u64,
    /// `None` means unlimited.
    pub limit: Option<u64>,
}

impl fmt::Display for NativeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "find({}).sort({}).skip({})", self.filter, self.sort, self.skip)?;
        if let Some(limit) = self.limit {
            write!(f, ".limit({})", limit)?;
        }
        Ok(())
    }
}

/// Binds a request against the schema and translates it.
///
/// Fails with the same `FieldNotFound` / `TypeMismatch` errors as the
/// in-memory evaluator.
pub fn translate(request: &QueryRequest, schema: &RecordSchema) -> Result<NativeQuery> {
    Ok(translate_bound(&bind_request(request, schema)?))
}

/// Translates an already bound request.
pub fn translate_bound(query: &BoundQuery) -> NativeQuery {
    NativeQuery {
        filter: query.filter.as_ref().map(filter_document).unwrap_or_default(),
        sort: sort_document(&query.sorts),
        skip: query.offset,
        limit: query.limit,
    }
}

fn filter_document(filter: &BoundFilter) -> Document {
    match filter {
        BoundFilter::Leaf(leaf) => leaf_document(leaf),
        BoundFilter::And(children) => doc! { "$and": children_array(children) },
        BoundFilter::Or(children) => doc! { "$or": children_array(children) },
    }
}

fn children_array(children: &[BoundFilter]) -> Vec<Bson> {
    children
        .iter()
        .map(|c| Bson::Document(filter_document(c)))
        .collect()
}

fn leaf_document(leaf: &BoundLeaf) -> Document {
    let condition = match &leaf.predicate {
        Predicate::Compare(op, v) => {
            let mut d = Document::new();
            d.insert(compare_operator(*op), value_to_bson(v));
            d
        }
        Predicate::Between(lo, hi) => doc! { "$gte": value_to_bson(lo), "$lte": value_to_bson(hi) },
        Predicate::In(set) | Predicate::ContainsAny(set) => doc! { "$in": bson_array(set) },
        Predicate::ContainsAll(set) => doc! { "$all": bson_array(set) },
        Predicate::IsNull => doc! { "$eq": Bson::Null },
        Predicate::NotNull => doc! { "$ne": Bson::Null },
        Predicate::Substring(needle) => doc! { "$regex": regex::escape(needle), "$options": "s" },
        Predicate::HasElement(v) => doc! { "$elemMatch": { "$eq": value_to_bson(v) } },
        Predicate::Like(pattern) => doc! { "$regex": like_regex(pattern), "$options": "s" },
    };
    let mut d = Document::new();
    d.insert(leaf.field.name(), condition);
    d
}

fn compare_operator(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Eq => "$eq",
        CompareOp::Gt => "$gt",
        CompareOp::Ge => "$gte",
        CompareOp::Lt => "$lt",
        CompareOp::Le => "$lte",
    }
}

fn bson_array(values: &[flowdex_core::Value]) -> Vec<Bson> {
    values.iter().map(value_to_bson).collect()
}

/// Compiles a `like` pattern into an anchored regular expression.
///
/// Literal runs are escaped; every `*` becomes `.*`. The anchors are
/// `\A` and `\z`, which mean start and end of text in both PCRE and `regex`.
pub fn like_regex(pattern: &str) -> String {
    let body: Vec<String> = wildcard_segments(pattern)
        .into_iter()
        .map(regex::escape)
        .collect();
    format!("\\A{}\\z", body.join(".*"))
}

/// Renders sort keys in significance order.
///
/// A repeated field never affects the order, so only its first occurrence
/// is kept.
fn sort_document(sorts: &[BoundSort]) -> Document {
    let mut d = Document::new();
    for s in sorts {
        if d.contains_key(s.field.name()) {
            continue;
        }
        let direction = match s.direction {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        };
        d.insert(s.field.name(), Bson::Int32(direction));
    }
    d
}
