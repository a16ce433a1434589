//! Binds filter expressions and sort criteria to a record schema.
//!
//! Binding resolves every field name, checks each operand against the
//! declared type and shape of its field, and normalizes operands (integer
//! epoch milliseconds become `DateTime` on timestamp fields). Both
//! evaluators consume the bound form, so a request is rejected with the
//! same error no matter which backend would have run it.

use crate::ast::{
    Combinator, FilterExpression, Operator, OperatorKind, QueryRequest, SortCriterion, SortDirection,
};
use flowdex_core::schema::{FieldDef, RecordSchema};
use flowdex_core::{DataType, Error, Result, Value};
use std::cmp::Ordering;

/// Comparison operator of a bound leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    /// Tests an ordering of `field value` relative to the operand.
    #[inline]
    pub fn test(&self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord == Ordering::Equal,
            CompareOp::Gt => ord == Ordering::Greater,
            CompareOp::Ge => ord != Ordering::Less,
            CompareOp::Lt => ord == Ordering::Less,
            CompareOp::Le => ord != Ordering::Greater,
        }
    }
}

/// A leaf test with operands normalized to the field type.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    Compare(CompareOp, Value),
    Between(Value, Value),
    In(Vec<Value>),
    IsNull,
    NotNull,
    /// `contains` on a scalar string field.
    Substring(String),
    /// `contains` on a collection field.
    HasElement(Value),
    ContainsAny(Vec<Value>),
    ContainsAll(Vec<Value>),
    Like(String),
}

/// A leaf resolved against the schema.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundLeaf {
    pub field: FieldDef,
    pub predicate: Predicate,
}

/// A filter tree resolved against the schema.
#[derive(Clone, Debug, PartialEq)]
pub enum BoundFilter {
    Leaf(BoundLeaf),
    And(Vec<BoundFilter>),
    Or(Vec<BoundFilter>),
}

/// A sort key resolved against the schema.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundSort {
    pub field: FieldDef,
    pub direction: SortDirection,
}

/// A fully bound request.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundQuery {
    /// `None` matches every entry.
    pub filter: Option<BoundFilter>,
    pub sorts: Vec<BoundSort>,
    pub offset: u64,
    pub limit: Option<u64>,
}

/// Binds a whole request.
pub fn bind_request(request: &QueryRequest, schema: &RecordSchema) -> Result<BoundQuery> {
    Ok(BoundQuery {
        filter: bind(&request.filters, schema)?,
        sorts: bind_sorts(&request.sorts, schema)?,
        offset: request.offset.unwrap_or(0),
        limit: request.limit,
    })
}

/// Binds top-level filters, AND-combining them.
pub fn bind(filters: &[FilterExpression], schema: &RecordSchema) -> Result<Option<BoundFilter>> {
    let mut bound = filters
        .iter()
        .map(|f| bind_expr(f, schema))
        .collect::<Result<Vec<_>>>()?;
    Ok(match bound.len() {
        0 => None,
        1 => bound.pop(),
        _ => Some(BoundFilter::And(bound)),
    })
}

/// Binds sort criteria. Collection fields cannot be sorted on.
pub fn bind_sorts(sorts: &[SortCriterion], schema: &RecordSchema) -> Result<Vec<BoundSort>> {
    sorts
        .iter()
        .map(|s| {
            let field = schema.resolve(&s.field)?;
            if field.is_collection() {
                return Err(Error::type_mismatch(
                    field.name(),
                    "scalar field for sorting",
                    field.type_label(),
                ));
            }
            Ok(BoundSort {
                field: field.clone(),
                direction: s.direction,
            })
        })
        .collect()
}

fn bind_expr(expr: &FilterExpression, schema: &RecordSchema) -> Result<BoundFilter> {
    match expr {
        FilterExpression::Leaf { field, operator } => {
            let field = schema.resolve(field)?;
            Ok(BoundFilter::Leaf(BoundLeaf {
                predicate: bind_operator(field, operator)?,
                field: field.clone(),
            }))
        }
        FilterExpression::Composite {
            combinator,
            children,
        } => {
            if children.is_empty() {
                return Err(Error::empty_composite(combinator.name()));
            }
            let bound = children
                .iter()
                .map(|c| bind_expr(c, schema))
                .collect::<Result<Vec<_>>>()?;
            Ok(match combinator {
                Combinator::And => BoundFilter::And(bound),
                Combinator::Or => BoundFilter::Or(bound),
            })
        }
    }
}

fn bind_operator(field: &FieldDef, operator: &Operator) -> Result<Predicate> {
    let kind = operator.kind();
    let predicate = match operator {
        Operator::EqualTo(v) => compare(field, kind, CompareOp::Eq, v)?,
        Operator::GreaterThan(v) => compare(field, kind, CompareOp::Gt, v)?,
        Operator::GreaterThanEqual(v) => compare(field, kind, CompareOp::Ge, v)?,
        Operator::LessThan(v) => compare(field, kind, CompareOp::Lt, v)?,
        Operator::LessThanEqual(v) => compare(field, kind, CompareOp::Le, v)?,
        Operator::Between(lo, hi) => {
            require_scalar(field, kind)?;
            Predicate::Between(operand(field, lo)?, operand(field, hi)?)
        }
        Operator::In(set) => {
            require_scalar(field, kind)?;
            Predicate::In(operand_set(field, kind, set)?)
        }
        Operator::IsNull => Predicate::IsNull,
        Operator::NotNull => Predicate::NotNull,
        Operator::Contains(v) => {
            if field.is_collection() {
                Predicate::HasElement(operand(field, v)?)
            } else {
                require_string(field, kind)?;
                match operand(field, v)? {
                    Value::String(s) => Predicate::Substring(s),
                    other => {
                        return Err(Error::type_mismatch(field.name(), "String", other.kind_name()))
                    }
                }
            }
        }
        Operator::ContainsAny(set) => Predicate::ContainsAny(operand_set(field, kind, set)?),
        Operator::ContainsAll(set) => Predicate::ContainsAll(operand_set(field, kind, set)?),
        Operator::Like(pattern) => {
            require_scalar(field, kind)?;
            require_string(field, kind)?;
            Predicate::Like(pattern.clone())
        }
    };
    Ok(predicate)
}

fn compare(field: &FieldDef, kind: OperatorKind, op: CompareOp, v: &Value) -> Result<Predicate> {
    require_scalar(field, kind)?;
    Ok(Predicate::Compare(op, operand(field, v)?))
}

fn require_scalar(field: &FieldDef, kind: OperatorKind) -> Result<()> {
    if field.is_collection() {
        return Err(Error::type_mismatch(
            field.name(),
            format!("scalar field for {}", kind),
            field.type_label(),
        ));
    }
    Ok(())
}

fn require_string(field: &FieldDef, kind: OperatorKind) -> Result<()> {
    if field.data_type() != DataType::String {
        return Err(Error::type_mismatch(
            field.name(),
            format!("String field for {}", kind),
            field.type_label(),
        ));
    }
    Ok(())
}

fn operand_set(field: &FieldDef, kind: OperatorKind, set: &[Value]) -> Result<Vec<Value>> {
    if set.is_empty() {
        return Err(Error::invalid_filter(format!("{} requires a non-empty set", kind)));
    }
    set.iter().map(|v| operand(field, v)).collect()
}

/// Checks one operand against the field's element type and normalizes it.
fn operand(field: &FieldDef, value: &Value) -> Result<Value> {
    let data_type = field.data_type();
    if value.is_null() || !data_type.accepts(value) {
        return Err(Error::type_mismatch(
            field.name(),
            data_type.name(),
            value.kind_name(),
        ));
    }
    Ok(match (data_type, value) {
        (DataType::DateTime, Value::Int32(ms)) => Value::DateTime(i64::from(*ms)),
        (DataType::DateTime, Value::Int64(ms)) => Value::DateTime(*ms),
        _ => value.clone(),
    })
}
