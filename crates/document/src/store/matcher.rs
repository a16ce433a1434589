//! Query-document matching and sorting for the embedded store.
//!
//! Supports the subset of MongoDB query grammar the translator emits:
//! `$and $or $eq $ne $gt $gte $lt $lte $in $all $regex/$options
//! $elemMatch`, dotted paths through embedded documents, array element
//! semantics and null-matches-missing. Queryable fields never path through
//! an array of documents, so such a path reads as missing.

use bson::{Bson, Document};
use flowdex_core::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;

/// A compiled filter document.
#[derive(Debug)]
pub struct Matcher {
    root: Node,
}

#[derive(Debug)]
enum Node {
    And(Vec<Node>),
    Or(Vec<Node>),
    Field { path: Vec<String>, conds: Vec<Cond> },
}

#[derive(Debug)]
enum Cond {
    Eq(Bson),
    Ne(Bson),
    Cmp(Ordering, bool, Bson),
    In(Vec<Bson>),
    All(Vec<Bson>),
    Regex(Regex),
    ElemMatch(Vec<Cond>),
}

impl Matcher {
    /// Compiles a filter document. An empty document matches everything.
    pub fn compile(filter: &Document) -> Result<Self> {
        Ok(Self {
            root: compile_document(filter)?,
        })
    }

    /// Tests a stored document.
    pub fn matches(&self, document: &Document) -> bool {
        eval_node(&self.root, document)
    }
}

fn unsupported(what: impl std::fmt::Display) -> Error {
    Error::storage_unavailable(format!("unsupported query: {}", what))
}

fn compile_document(filter: &Document) -> Result<Node> {
    let mut nodes = Vec::with_capacity(filter.len());
    for (key, value) in filter {
        let node = match key.as_str() {
            "$and" | "$or" => {
                let children = value
                    .as_array()
                    .ok_or_else(|| unsupported(format!("{} expects an array", key)))?
                    .iter()
                    .map(|c| match c {
                        Bson::Document(d) => compile_document(d),
                        other => Err(unsupported(format!("{} element {}", key, other))),
                    })
                    .collect::<Result<Vec<_>>>()?;
                if key == "$and" {
                    Node::And(children)
                } else {
                    Node::Or(children)
                }
            }
            op if op.starts_with('$') => return Err(unsupported(op)),
            path => Node::Field {
                path: path.split('.').map(str::to_string).collect(),
                conds: compile_conditions(value)?,
            },
        };
        nodes.push(node);
    }
    Ok(match nodes.len() {
        1 => nodes.remove(0),
        _ => Node::And(nodes),
    })
}

fn is_operator_document(value: &Bson) -> Option<&Document> {
    match value {
        Bson::Document(d) if !d.is_empty() && d.keys().all(|k| k.starts_with('$')) => Some(d),
        _ => None,
    }
}

fn compile_conditions(value: &Bson) -> Result<Vec<Cond>> {
    let Some(ops) = is_operator_document(value) else {
        return Ok(vec![Cond::Eq(value.clone())]);
    };
    let mut conds = Vec::with_capacity(ops.len());
    for (op, operand) in ops {
        let cond = match op.as_str() {
            "$eq" => Cond::Eq(operand.clone()),
            "$ne" => Cond::Ne(operand.clone()),
            "$gt" => Cond::Cmp(Ordering::Greater, false, operand.clone()),
            "$gte" => Cond::Cmp(Ordering::Greater, true, operand.clone()),
            "$lt" => Cond::Cmp(Ordering::Less, false, operand.clone()),
            "$lte" => Cond::Cmp(Ordering::Less, true, operand.clone()),
            "$in" => Cond::In(array_operand(op, operand)?),
            "$all" => Cond::All(array_operand(op, operand)?),
            "$regex" => {
                let pattern = operand
                    .as_str()
                    .ok_or_else(|| unsupported("$regex expects a string"))?;
                let options = ops.get_str("$options").unwrap_or("");
                Cond::Regex(compile_regex(pattern, options)?)
            }
            "$options" => continue,
            "$elemMatch" => Cond::ElemMatch(compile_conditions(operand)?),
            other => return Err(unsupported(other)),
        };
        conds.push(cond);
    }
    Ok(conds)
}

fn array_operand(op: &str, operand: &Bson) -> Result<Vec<Bson>> {
    operand
        .as_array()
        .cloned()
        .ok_or_else(|| unsupported(format!("{} expects an array", op)))
}

fn compile_regex(pattern: &str, options: &str) -> Result<Regex> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in options.chars() {
        match flag {
            's' => builder.dot_matches_new_line(true),
            'i' => builder.case_insensitive(true),
            'm' => builder.multi_line(true),
            'x' => builder.ignore_whitespace(true),
            other => return Err(unsupported(format!("$options flag `{}`", other))),
        };
    }
    builder
        .build()
        .map_err(|e| Error::storage("invalid $regex", e))
}

fn eval_node(node: &Node, document: &Document) -> bool {
    match node {
        Node::And(children) => children.iter().all(|c| eval_node(c, document)),
        Node::Or(children) => children.iter().any(|c| eval_node(c, document)),
        Node::Field { path, conds } => {
            let candidates = [lookup(document, path)];
            conds.iter().all(|c| eval_cond(c, &candidates))
        }
    }
}

/// Reads the value a dotted path reaches; `None` when it is missing.
fn lookup<'a>(document: &'a Document, path: &[String]) -> Option<&'a Bson> {
    let (last, parents) = path.split_last()?;
    let mut current = document;
    for segment in parents {
        match current.get(segment)? {
            Bson::Document(d) => current = d,
            _ => return None,
        }
    }
    current.get(last)
}

/// Applies `test` to each candidate and, for arrays, to each element.
fn any_value(candidates: &[Option<&Bson>], test: impl Fn(&Bson) -> bool) -> bool {
    candidates.iter().flatten().any(|v| match v {
        Bson::Array(items) => test(v) || items.iter().any(&test),
        scalar => test(scalar),
    })
}

fn equals_any(candidates: &[Option<&Bson>], operand: &Bson) -> bool {
    if matches!(operand, Bson::Null) && candidates.iter().any(Option::is_none) {
        return true;
    }
    any_value(candidates, |v| bson_eq(v, operand))
}

fn eval_cond(cond: &Cond, candidates: &[Option<&Bson>]) -> bool {
    match cond {
        Cond::Eq(operand) => equals_any(candidates, operand),
        Cond::Ne(operand) => !equals_any(candidates, operand),
        Cond::Cmp(direction, inclusive, operand) => any_value(candidates, |v| {
            match compare_same_bracket(v, operand) {
                Some(Ordering::Equal) => *inclusive,
                Some(ord) => ord == *direction,
                None => false,
            }
        }),
        Cond::In(set) => set.iter().any(|s| equals_any(candidates, s)),
        Cond::All(set) => !set.is_empty() && set.iter().all(|s| equals_any(candidates, s)),
        Cond::Regex(re) => any_value(candidates, |v| v.as_str().is_some_and(|s| re.is_match(s))),
        Cond::ElemMatch(conds) => candidates.iter().flatten().any(|v| match v {
            Bson::Array(items) => items
                .iter()
                .any(|item| conds.iter().all(|c| eval_cond(c, &[Some(item)]))),
            _ => false,
        }),
    }
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

fn as_integer(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        _ => None,
    }
}

/// Compares values of the same type bracket; `None` across brackets.
fn compare_same_bracket(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.as_bytes().cmp(y.as_bytes())),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => match (as_integer(a), as_integer(b)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => as_number(a)?.partial_cmp(&as_number(b)?),
        },
    }
}

fn bson_eq(a: &Bson, b: &Bson) -> bool {
    match (a, b) {
        (Bson::Array(x), Bson::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(p, q)| bson_eq(p, q))
        }
        (Bson::Document(x), Bson::Document(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && bson_eq(va, vb))
        }
        _ => compare_same_bracket(a, b) == Some(Ordering::Equal) || a == b,
    }
}

/// Sort rank of a value's type bracket; null and missing sort lowest.
fn bracket(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 0,
        Some(Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_)) => 1,
        Some(Bson::String(_) | Bson::Symbol(_)) => 2,
        Some(Bson::Document(_)) => 3,
        Some(Bson::Array(_)) => 4,
        Some(Bson::Binary(_)) => 5,
        Some(Bson::ObjectId(_)) => 6,
        Some(Bson::Boolean(_)) => 7,
        Some(Bson::DateTime(_)) => 8,
        Some(Bson::Timestamp(_)) => 9,
        Some(Bson::RegularExpression(_)) => 10,
        Some(_) => 11,
    }
}

fn sort_value(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let (ra, rb) = (bracket(a), bracket(b));
    if ra != rb {
        return ra.cmp(&rb);
    }
    match (a, b) {
        (Some(x), Some(y)) => compare_same_bracket(x, y).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// A compiled sort specification, `{path: 1 | -1}`.
#[derive(Debug)]
pub struct SortSpec {
    keys: Vec<(Vec<String>, bool)>,
}

impl SortSpec {
    /// Compiles a sort document; each direction must be `1` or `-1`.
    pub fn compile(sort: &Document) -> Result<Self> {
        let keys = sort
            .iter()
            .map(|(path, direction)| {
                let descending = match as_integer(direction) {
                    Some(1) => false,
                    Some(-1) => true,
                    _ => return Err(unsupported(format!("sort direction {}", direction))),
                };
                Ok((path.split('.').map(str::to_string).collect(), descending))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { keys })
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Stable sort; documents equal on every key keep their order.
    pub fn sort(&self, documents: &mut [&Document]) {
        if self.keys.is_empty() {
            return;
        }
        documents.sort_by(|a, b| self.compare(a, b));
    }

    fn compare(&self, a: &Document, b: &Document) -> Ordering {
        for (path, descending) in &self.keys {
            let ord = sort_value(lookup(a, path), lookup(b, path));
            if ord != Ordering::Equal {
                return if *descending { ord.reverse() } else { ord };
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    fn job() -> Document {
        doc! {
            "_id": "job1",
            "status": "SCHEDULED",
            "priority": 1,
            "retries": 10i64,
            "rootProcessInstanceId": null,
            "roles": ["admin", "ops"],
            "error": { "message": "line1\nline2" },
            "nodes": [ { "name": "start" }, { "name": "end" } ]
        }
    }

    fn check(filter: Document) -> bool {
        Matcher::compile(&filter).unwrap().matches(&job())
    }

    #[test]
    fn test_match_comparisons() {
        assert!(check(doc! { "priority": { "$gte": 1, "$lte": 1 } }));
        assert!(!check(doc! { "priority": { "$gt": 1 } }));
        assert!(check(doc! { "retries": { "$lt": 11 } }));
        assert!(check(doc! { "priority": { "$eq": 1.0 } }));
        // cross-bracket comparisons never match
        assert!(!check(doc! { "status": { "$gt": 1 } }));
    }

    #[test]
    fn test_match_null_and_missing() {
        assert!(check(doc! { "rootProcessInstanceId": { "$eq": null } }));
        assert!(check(doc! { "missing": { "$eq": null } }));
        assert!(!check(doc! { "status": { "$eq": null } }));
        assert!(check(doc! { "status": { "$ne": null } }));
        assert!(!check(doc! { "missing": { "$ne": null } }));
    }

    #[test]
    fn test_match_arrays() {
        assert!(check(doc! { "roles": { "$in": ["x", "ops"] } }));
        assert!(check(doc! { "roles": { "$all": ["ops", "admin"] } }));
        assert!(!check(doc! { "roles": { "$all": ["ops", "x"] } }));
        assert!(check(doc! { "roles": { "$elemMatch": { "$eq": "admin" } } }));
        assert!(!check(doc! { "status": { "$elemMatch": { "$eq": "SCHEDULED" } } }));
        assert!(check(doc! { "status": { "$all": ["SCHEDULED"] } }));
    }

    #[test]
    fn test_match_dotted_paths() {
        assert!(check(doc! { "error.message": { "$regex": "^line1.*2$", "$options": "s" } }));
        assert!(!check(doc! { "error.message": { "$regex": "^line1.*2$" } }));
        assert!(!check(doc! { "nodes.name": { "$eq": "end" } }));
        assert!(check(doc! { "error.code": { "$eq": null } }));
    }

    #[test]
    fn test_match_composites() {
        assert!(check(doc! { "$or": [ { "priority": 5 }, { "status": "SCHEDULED" } ] }));
        assert!(!check(doc! { "$and": [ { "priority": 1 }, { "status": "EXPECTED" } ] }));
        assert!(check(doc! {}));
    }

    #[test]
    fn test_unsupported_operator() {
        let err = Matcher::compile(&doc! { "a": { "$where": "1" } }).unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
    }

    #[test]
    fn test_sort_nulls_and_stability() {
        let docs = vec![
            doc! { "_id": "a", "k": "x" },
            doc! { "_id": "b", "k": null },
            doc! { "_id": "c", "k": "x" },
            doc! { "_id": "d" },
        ];
        let spec = SortSpec::compile(&doc! { "k": 1 }).unwrap();
        let mut refs: Vec<&Document> = docs.iter().collect();
        spec.sort(&mut refs);
        let ids: Vec<&str> = refs.iter().map(|d| d.get_str("_id").unwrap()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);

        let spec = SortSpec::compile(&doc! { "k": -1 }).unwrap();
        let mut refs: Vec<&Document> = docs.iter().collect();
        spec.sort(&mut refs);
        let ids: Vec<&str> = refs.iter().map(|d| d.get_str("_id").unwrap()).collect();
        assert_eq!(ids, vec!["a", "c", "b", "d"]);
    }
}
