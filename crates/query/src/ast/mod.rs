//! AST module for filter expressions and query requests.

pub mod builder;
mod filter;
mod operator;
mod request;

pub use filter::{Combinator, FilterExpression};
pub use operator::{Operator, OperatorKind};
pub use request::{QueryRequest, SortCriterion, SortDirection};
