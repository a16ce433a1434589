//! Value type definitions for Flowdex.
//!
//! This module defines the `Value` enum which represents a field value
//! extracted from a record, or an operand in a filter.

use crate::types::DataType;
use chrono::{DateTime, Utc};
use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

/// A field value or filter operand.
///
/// Serialized untagged so that transports can send plain JSON operands.
/// Integers always deserialize as `Int64`; the binder narrows them against
/// the declared field type.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value (absent and explicit null are the same thing)
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    #[serde(skip_deserializing)]
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Float64(f64),
    /// UTF-8 string
    String(String),
    /// DateTime stored as Unix timestamp in milliseconds
    #[serde(skip_deserializing)]
    DateTime(i64),
    /// Collection of values
    List(Vec<Value>),
}

impl Value {
    /// Returns the data type of this value, or None if it's Null or a List.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null | Value::List(_) => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int32(_) => Some(DataType::Int32),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::String(_) => Some(DataType::String),
            Value::DateTime(_) => Some(DataType::DateTime),
        }
    }

    /// Returns the name used for this value's kind in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::List(_) => "List",
            other => other.data_type().map(|dt| dt.name()).unwrap_or("Null"),
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for Int32, Int64 and Float64.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int32(_) | Value::Int64(_) | Value::Float64(_))
    }

    /// Returns the integer value widened to i64 if this is Int32 or Int64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(*v as i64),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a String, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Builds a list value from string elements.
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Value::List(items.into_iter().map(|s| Value::String(s.into())).collect())
    }

    /// Compares two non-null values under filter semantics.
    ///
    /// Numbers compare numerically and exactly across widths, DateTime
    /// compares with DateTime, strings compare by UTF-8 bytes. Returns
    /// `None` when the values are not comparable (different kinds, Null,
    /// NaN, lists).
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::Float64(f), int) if int.is_numeric() => {
                cmp_int_float(int.as_i64()?, *f).map(Ordering::reverse)
            }
            (int, Value::Float64(f)) if int.is_numeric() => cmp_int_float(int.as_i64()?, *f),
            (a, b) if a.is_numeric() && b.is_numeric() => Some(a.as_i64()?.cmp(&b.as_i64()?)),
            _ => None,
        }
    }

    /// Returns true when `compare` finds the values equal.
    #[inline]
    pub fn matches(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    fn is_nan(&self) -> bool {
        matches!(self, Value::Float64(f) if f.is_nan())
    }

    /// Returns a type ordering value for comparing different types.
    ///
    /// Numbers share one rank so that mixed widths sort numerically.
    fn type_order(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Int32(_) | Value::Int64(_) | Value::Float64(_) => 1,
            Value::String(_) => 2,
            Value::List(_) => 3,
            Value::Boolean(_) => 4,
            Value::DateTime(_) => 5,
        }
    }
}

/// Compares an integer with a float without rounding either; `None` for NaN.
fn cmp_int_float(i: i64, f: f64) -> Option<Ordering> {
    // 2^63, the first float above every i64
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return None;
    }
    if f >= BOUND {
        return Some(Ordering::Less);
    }
    if f < -BOUND {
        return Some(Ordering::Greater);
    }
    let whole = f.trunc();
    Some(i.cmp(&(whole as i64)).then_with(|| {
        if f > whole {
            Ordering::Less
        } else if f < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }))
}

/// Equality is `Ord` equality: numbers are equal across widths.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total order used for sorting: Null first, then by kind, then by value.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        if let Some(ord) = self.compare(other) {
            return ord;
        }
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            // NaN is all that is left; it sorts after every other number
            (a, b) if a.is_numeric() && b.is_numeric() => a.is_nan().cmp(&b.is_nan()),
            (Value::List(a), Value::List(b)) => a.cmp(b),
            _ => self.type_order().cmp(&other.type_order()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v.timestamp_millis())
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
