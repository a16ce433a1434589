//! In-memory query executor module.

mod field_table;
mod filter;
mod limit;
mod runner;
mod sort;

pub use field_table::{Accessor, FieldTable, FieldTableBuilder, Record};
pub use filter::{eval_leaf, FilterExecutor};
pub use limit::LimitExecutor;
pub use runner::QueryRunner;
pub use sort::SortExecutor;
