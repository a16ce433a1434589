//! Data type definitions for Flowdex records.
//!
//! This module defines the element types a record field can hold and
//! whether the field holds a single value or a collection of them.

use crate::value::Value;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Element type of a record field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean type (true/false)
    Boolean,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit floating point number
    Float64,
    /// UTF-8 string
    String,
    /// Date and time stored as Unix timestamp (milliseconds)
    DateTime,
}

impl DataType {
    /// Returns whether this type is one of the numeric types.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int32 | DataType::Int64 | DataType::Float64)
    }

    /// Returns whether a non-null operand can be compared against this type.
    ///
    /// Numeric types are mutually comparable. DateTime fields also accept
    /// integer operands, read as epoch milliseconds.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (DataType::Boolean, Value::Boolean(_)) => true,
            (DataType::String, Value::String(_)) => true,
            (DataType::DateTime, Value::DateTime(_) | Value::Int32(_) | Value::Int64(_)) => true,
            (dt, v) if dt.is_numeric() => v.is_numeric(),
            _ => false,
        }
    }

    /// Returns the type name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Boolean => "Boolean",
            DataType::Int32 => "Int32",
            DataType::Int64 => "Int64",
            DataType::Float64 => "Float64",
            DataType::String => "String",
            DataType::DateTime => "DateTime",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a field holds one value or a collection of values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    #[default]
    Scalar,
    Collection,
}
