//! Leaf operators and their operands.

use flowdex_core::{Error, Result, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A leaf operator carrying its operand(s).
///
/// Serialized externally tagged in camelCase, e.g. `{"equalTo": 5}`,
/// `{"between": [0, 3]}` or `"isNull"`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    EqualTo(Value),
    GreaterThan(Value),
    GreaterThanEqual(Value),
    LessThan(Value),
    LessThanEqual(Value),
    /// Inclusive on both ends.
    Between(Value, Value),
    In(Vec<Value>),
    IsNull,
    NotNull,
    Contains(Value),
    ContainsAny(Vec<Value>),
    ContainsAll(Vec<Value>),
    /// Whole-value wildcard match, see [`flowdex_core::pattern_match`].
    Like(String),
}

/// Operator discriminant, used to assemble leaves dynamically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperatorKind {
    EqualTo,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    Between,
    In,
    IsNull,
    NotNull,
    Contains,
    ContainsAny,
    ContainsAll,
    Like,
}

impl OperatorKind {
    /// Returns the camelCase operator name.
    pub fn name(&self) -> &'static str {
        match self {
            OperatorKind::EqualTo => "equalTo",
            OperatorKind::GreaterThan => "greaterThan",
            OperatorKind::GreaterThanEqual => "greaterThanEqual",
            OperatorKind::LessThan => "lessThan",
            OperatorKind::LessThanEqual => "lessThanEqual",
            OperatorKind::Between => "between",
            OperatorKind::In => "in",
            OperatorKind::IsNull => "isNull",
            OperatorKind::NotNull => "notNull",
            OperatorKind::Contains => "contains",
            OperatorKind::ContainsAny => "containsAny",
            OperatorKind::ContainsAll => "containsAll",
            OperatorKind::Like => "like",
        }
    }

    /// Builds an operator from loose operands, checking arity.
    pub fn with_operands(self, operands: Vec<Value>) -> Result<Operator> {
        let mut operands = operands;
        let op = match self {
            OperatorKind::IsNull | OperatorKind::NotNull => {
                expect_arity(self, &operands, 0)?;
                if self == OperatorKind::IsNull {
                    Operator::IsNull
                } else {
                    Operator::NotNull
                }
            }
            OperatorKind::Between => {
                expect_arity(self, &operands, 2)?;
                let hi = operands.pop().unwrap_or(Value::Null);
                let lo = operands.pop().unwrap_or(Value::Null);
                Operator::Between(lo, hi)
            }
            OperatorKind::In | OperatorKind::ContainsAny | OperatorKind::ContainsAll => {
                non_empty_set(self, &operands)?;
                match self {
                    OperatorKind::In => Operator::In(operands),
                    OperatorKind::ContainsAny => Operator::ContainsAny(operands),
                    _ => Operator::ContainsAll(operands),
                }
            }
            OperatorKind::Like => {
                expect_arity(self, &operands, 1)?;
                match operands.pop() {
                    Some(Value::String(pattern)) => Operator::Like(pattern),
                    Some(other) => {
                        return Err(Error::invalid_filter(format!(
                            "like requires a string pattern, got {}",
                            other.kind_name()
                        )))
                    }
                    None => return Err(Error::invalid_filter("like requires a pattern")),
                }
            }
            single => {
                expect_arity(single, &operands, 1)?;
                let v = operands.pop().unwrap_or(Value::Null);
                match single {
                    OperatorKind::EqualTo => Operator::EqualTo(v),
                    OperatorKind::GreaterThan => Operator::GreaterThan(v),
                    OperatorKind::GreaterThanEqual => Operator::GreaterThanEqual(v),
                    OperatorKind::LessThan => Operator::LessThan(v),
                    OperatorKind::LessThanEqual => Operator::LessThanEqual(v),
                    _ => Operator::Contains(v),
                }
            }
        };
        Ok(op)
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn expect_arity(kind: OperatorKind, operands: &[Value], n: usize) -> Result<()> {
    if operands.len() != n {
        return Err(Error::invalid_filter(format!(
            "{} takes {} operand(s), got {}",
            kind,
            n,
            operands.len()
        )));
    }
    Ok(())
}

pub(crate) fn non_empty_set(kind: OperatorKind, operands: &[Value]) -> Result<()> {
    if operands.is_empty() {
        return Err(Error::invalid_filter(format!(
            "{} requires a non-empty set",
            kind
        )));
    }
    Ok(())
}

impl Operator {
    /// Returns the operator discriminant.
    pub fn kind(&self) -> OperatorKind {
        match self {
            Operator::EqualTo(_) => OperatorKind::EqualTo,
            Operator::GreaterThan(_) => OperatorKind::GreaterThan,
            Operator::GreaterThanEqual(_) => OperatorKind::GreaterThanEqual,
            Operator::LessThan(_) => OperatorKind::LessThan,
            Operator::LessThanEqual(_) => OperatorKind::LessThanEqual,
            Operator::Between(..) => OperatorKind::Between,
            Operator::In(_) => OperatorKind::In,
            Operator::IsNull => OperatorKind::IsNull,
            Operator::NotNull => OperatorKind::NotNull,
            Operator::Contains(_) => OperatorKind::Contains,
            Operator::ContainsAny(_) => OperatorKind::ContainsAny,
            Operator::ContainsAll(_) => OperatorKind::ContainsAll,
            Operator::Like(_) => OperatorKind::Like,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_operands_arity() {
        assert!(OperatorKind::Between
            .with_operands(vec![Value::Int32(1)])
            .is_err());
        assert!(OperatorKind::IsNull
            .with_operands(vec![Value::Int32(1)])
            .is_err());
        assert!(OperatorKind::In.with_operands(vec![]).is_err());
        assert!(OperatorKind::EqualTo.with_operands(vec![]).is_err());
    }

    #[test]
    fn test_with_operands_between_order() {
        let op = OperatorKind::Between
            .with_operands(vec![Value::Int32(0), Value::Int32(3)])
            .unwrap();
        assert_eq!(op, Operator::Between(Value::Int32(0), Value::Int32(3)));
        assert_eq!(op.kind(), OperatorKind::Between);
    }

    #[test]
    fn test_with_operands_like() {
        let op = OperatorKind::Like
            .with_operands(vec![Value::from("*_job1")])
            .unwrap();
        assert_eq!(op, Operator::Like("*_job1".into()));

        let err = OperatorKind::Like.with_operands(vec![Value::Int64(1)]);
        assert!(matches!(err, Err(Error::InvalidFilter { .. })));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(OperatorKind::ContainsAll.name(), "containsAll");
        assert_eq!(OperatorKind::GreaterThanEqual.to_string(), "greaterThanEqual");
    }
}
