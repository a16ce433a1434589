//! Filter expression tree.

use super::operator::{Operator, OperatorKind};
use flowdex_core::{Error, Result, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical combinator of a composite expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    /// Returns the combinator keyword.
    pub fn name(&self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A filter predicate: either a single field test or a logical
/// combination of child predicates.
///
/// Expressions are plain immutable values; building one never touches a
/// cache or a record, and field names are only checked when the
/// expression is bound against a record schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterExpression {
    /// Tests one (possibly dotted) field.
    Leaf { field: String, operator: Operator },
    /// Combines non-empty children with `and` / `or`.
    Composite {
        combinator: Combinator,
        children: Vec<FilterExpression>,
    },
}

impl FilterExpression {
    /// Creates a leaf from an operator kind and loose operands.
    ///
    /// Applies the same arity checks as the typed builders.
    pub fn leaf(
        field: impl Into<String>,
        kind: OperatorKind,
        operands: Vec<Value>,
    ) -> Result<Self> {
        Ok(FilterExpression::Leaf {
            field: field.into(),
            operator: kind.with_operands(operands)?,
        })
    }

    /// Creates a composite, collapsing a single child to itself.
    pub fn composite(combinator: Combinator, mut children: Vec<FilterExpression>) -> Result<Self> {
        match children.len() {
            0 => Err(Error::empty_composite(combinator.name())),
            1 => Ok(children.remove(0)),
            _ => Ok(FilterExpression::Composite {
                combinator,
                children,
            }),
        }
    }

    /// Returns true for leaf expressions.
    pub fn is_leaf(&self) -> bool {
        matches!(self, FilterExpression::Leaf { .. })
    }

    /// Checks structural invariants of a deserialized tree.
    ///
    /// Builders cannot produce an empty composite or an empty set operand,
    /// but a transport deserializing a request can.
    pub fn validate(&self) -> Result<()> {
        match self {
            FilterExpression::Leaf { operator, .. } => match operator {
                Operator::In(set) | Operator::ContainsAny(set) | Operator::ContainsAll(set) => {
                    super::operator::non_empty_set(operator.kind(), set)
                }
                _ => Ok(()),
            },
            FilterExpression::Composite {
                combinator,
                children,
            } => {
                if children.is_empty() {
                    return Err(Error::empty_composite(combinator.name()));
                }
                children.iter().try_for_each(FilterExpression::validate)
            }
        }
    }

    /// Visits every leaf field name, depth first.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FilterExpression::Leaf { field, .. } => out.push(field),
            FilterExpression::Composite { children, .. } => {
                for child in children {
                    child.collect_fields(out);
                }
            }
        }
    }
}
