//! Field definition for Flowdex record schemas.

use crate::types::{DataType, Shape};

/// A queryable attribute of a record type.
///
/// The name doubles as the attribute's path: nested attributes of an
/// embedded sub-record use dotted names such as `error.message`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name (dotted for nested attributes).
    name: String,
    /// Element type of the field.
    data_type: DataType,
    /// Whether the field holds one value or a collection.
    shape: Shape,
    /// Field index in the record schema (0-based).
    index: usize,
}

impl FieldDef {
    /// Creates a new scalar field definition.
    pub fn scalar(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            shape: Shape::Scalar,
            index: 0,
        }
    }

    /// Creates a new collection field definition.
    pub fn collection(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            shape: Shape::Collection,
            index: 0,
        }
    }

    /// Sets the field index.
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// Returns the field name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the element data type.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Returns the field shape.
    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Returns whether the field holds a collection.
    #[inline]
    pub fn is_collection(&self) -> bool {
        self.shape == Shape::Collection
    }

    /// Returns the field index.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the path segments of the field name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.name.split('.')
    }

    /// Describes the declared type for error messages, e.g. `[String]`.
    pub fn type_label(&self) -> String {
        match self.shape {
            Shape::Scalar => self.data_type.name().to_string(),
            Shape::Collection => format!("[{}]", self.data_type.name()),
        }
    }
}
