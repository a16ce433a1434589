//! Builder functions for filter expressions and sort criteria.
//!
//! ```
//! use flowdex_query::ast::builder::*;
//! use flowdex_query::ast::SortDirection;
//!
//! let filter = or(vec![
//!     equal_to("status", "EXPECTED"),
//!     and(vec![greater_than_equal("retries", 10), less_than("retries", 11)]).unwrap(),
//! ])
//! .unwrap();
//! assert!(!filter.is_leaf());
//!
//! let sort = order_by("fullTypeName", SortDirection::Desc);
//! assert_eq!(sort.field, "fullTypeName");
//! ```

use super::filter::{Combinator, FilterExpression};
use super::operator::{non_empty_set, Operator, OperatorKind};
use super::request::{SortCriterion, SortDirection};
use flowdex_core::{Result, Value};

fn leaf(field: impl Into<String>, operator: Operator) -> FilterExpression {
    FilterExpression::Leaf {
        field: field.into(),
        operator,
    }
}

fn set<I, V>(kind: OperatorKind, values: I) -> Result<Vec<Value>>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let values: Vec<Value> = values.into_iter().map(Into::into).collect();
    non_empty_set(kind, &values)?;
    Ok(values)
}

pub fn equal_to(field: impl Into<String>, value: impl Into<Value>) -> FilterExpression {
    leaf(field, Operator::EqualTo(value.into()))
}

pub fn greater_than(field: impl Into<String>, value: impl Into<Value>) -> FilterExpression {
    leaf(field, Operator::GreaterThan(value.into()))
}

pub fn greater_than_equal(field: impl Into<String>, value: impl Into<Value>) -> FilterExpression {
    leaf(field, Operator::GreaterThanEqual(value.into()))
}

pub fn less_than(field: impl Into<String>, value: impl Into<Value>) -> FilterExpression {
    leaf(field, Operator::LessThan(value.into()))
}

pub fn less_than_equal(field: impl Into<String>, value: impl Into<Value>) -> FilterExpression {
    leaf(field, Operator::LessThanEqual(value.into()))
}

/// Inclusive range test. Operands are not reordered.
pub fn between(
    field: impl Into<String>,
    lower: impl Into<Value>,
    upper: impl Into<Value>,
) -> FilterExpression {
    leaf(field, Operator::Between(lower.into(), upper.into()))
}

/// Membership test; fails with `InvalidFilter` on an empty set.
pub fn is_in<I, V>(field: impl Into<String>, values: I) -> Result<FilterExpression>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Ok(leaf(field, Operator::In(set(OperatorKind::In, values)?)))
}

pub fn is_null(field: impl Into<String>) -> FilterExpression {
    leaf(field, Operator::IsNull)
}

pub fn not_null(field: impl Into<String>) -> FilterExpression {
    leaf(field, Operator::NotNull)
}

/// Substring test on string fields, element test on collection fields.
pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> FilterExpression {
    leaf(field, Operator::Contains(value.into()))
}

pub fn contains_any<I, V>(field: impl Into<String>, values: I) -> Result<FilterExpression>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Ok(leaf(
        field,
        Operator::ContainsAny(set(OperatorKind::ContainsAny, values)?),
    ))
}

pub fn contains_all<I, V>(field: impl Into<String>, values: I) -> Result<FilterExpression>
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    Ok(leaf(
        field,
        Operator::ContainsAll(set(OperatorKind::ContainsAll, values)?),
    ))
}

/// Whole-value wildcard match where `*` matches any run of characters.
pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> FilterExpression {
    leaf(field, Operator::Like(pattern.into()))
}

/// Conjunction; fails with `EmptyComposite` when `children` is empty.
pub fn and(children: Vec<FilterExpression>) -> Result<FilterExpression> {
    FilterExpression::composite(Combinator::And, children)
}

/// Disjunction; fails with `EmptyComposite` when `children` is empty.
pub fn or(children: Vec<FilterExpression>) -> Result<FilterExpression> {
    FilterExpression::composite(Combinator::Or, children)
}

pub fn order_by(field: impl Into<String>, direction: SortDirection) -> SortCriterion {
    SortCriterion::new(field, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowdex_core::Error;

    #[test]
    fn test_leaf_builders() {
        assert_eq!(
            equal_to("priority", 1),
            FilterExpression::Leaf {
                field: "priority".into(),
                operator: Operator::EqualTo(Value::Int32(1)),
            }
        );
        assert_eq!(
            between("priority", 0, 3),
            FilterExpression::leaf(
                "priority",
                OperatorKind::Between,
                vec![Value::Int32(0), Value::Int32(3)]
            )
            .unwrap()
        );
        assert_eq!(
            like("id", "*_job1"),
            FilterExpression::leaf("id", OperatorKind::Like, vec![Value::from("*_job1")]).unwrap()
        );
    }

    #[test]
    fn test_set_builders_reject_empty() {
        let empty: Vec<&str> = vec![];
        assert!(matches!(
            is_in("status", empty.clone()),
            Err(Error::InvalidFilter { .. })
        ));
        assert!(contains_any("roles", empty.clone()).is_err());
        assert!(contains_all("roles", empty).is_err());
        assert!(is_in("status", ["EXPECTED", "SCHEDULED"]).is_ok());
    }

    #[test]
    fn test_composites() {
        assert!(matches!(and(vec![]), Err(Error::EmptyComposite { combinator: "and" })));
        let single = or(vec![is_null("rootProcessInstanceId")]).unwrap();
        assert_eq!(single, is_null("rootProcessInstanceId"));
        let nested = and(vec![
            or(vec![equal_to("a", 1), equal_to("b", 2)]).unwrap(),
            not_null("c"),
        ])
        .unwrap();
        assert_eq!(nested.fields(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_builders_are_pure() {
        let a = contains("roles", "admin");
        let b = contains("roles", "admin");
        assert_eq!(a, b);
    }
}
