//! Record schema definition for Flowdex.

use super::field::FieldDef;
use crate::error::{Error, Result};
use crate::types::DataType;
use hashbrown::HashMap;

/// The queryable shape of one domain record type.
///
/// Both evaluators resolve filter and sort fields against this schema, so
/// an unknown field or an ill-typed operand is rejected the same way
/// whether the data lives in memory or in a document store.
#[derive(Clone, Debug)]
pub struct RecordSchema {
    /// Record (collection) name.
    name: String,
    /// Field definitions.
    fields: Vec<FieldDef>,
    /// Field name → index mapping.
    by_name: HashMap<String, usize>,
}

impl RecordSchema {
    /// Creates a new schema with the given name and fields.
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        let fields: Vec<FieldDef> = fields
            .into_iter()
            .enumerate()
            .map(|(i, f)| f.with_index(i))
            .collect();
        let by_name = fields
            .iter()
            .map(|f| (f.name().to_string(), f.index()))
            .collect();
        Self {
            name: name.into(),
            fields,
            by_name,
        }
    }

    /// Returns the record name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the fields.
    #[inline]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Gets a field by name.
    pub fn get_field(&self, name: &str) -> Option<&FieldDef> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Gets a field index by name.
    pub fn get_field_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Resolves a field by name, failing with `FieldNotFound`.
    pub fn resolve(&self, name: &str) -> Result<&FieldDef> {
        self.get_field(name)
            .ok_or_else(|| Error::field_not_found(&self.name, name))
    }
}

/// Builder for creating record schemas.
pub struct RecordSchemaBuilder {
    name: String,
    fields: Vec<FieldDef>,
}

impl RecordSchemaBuilder {
    /// Creates a new record schema builder.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::check_naming_rules(&name)?;
        Ok(Self {
            name,
            fields: Vec::new(),
        })
    }

    /// Validates a name follows naming rules.
    ///
    /// Each dot-separated segment must start with a letter or underscore
    /// and contain only ASCII alphanumerics and underscores.
    fn check_naming_rules(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_schema("Name cannot be empty"));
        }
        for segment in name.split('.') {
            let Some(first) = segment.chars().next() else {
                return Err(Error::invalid_schema(format!(
                    "Name has an empty path segment: {}",
                    name
                )));
            };
            if !first.is_ascii_alphabetic() && first != '_' {
                return Err(Error::invalid_schema(format!(
                    "Name must start with letter or underscore: {}",
                    name
                )));
            }
            if !segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(Error::invalid_schema(format!(
                    "Name contains invalid characters: {}",
                    name
                )));
            }
        }
        Ok(())
    }

    fn push(mut self, field: FieldDef) -> Result<Self> {
        Self::check_naming_rules(field.name())?;
        if self.fields.iter().any(|f| f.name() == field.name()) {
            return Err(Error::invalid_schema(format!(
                "Field already exists: {}",
                field.name()
            )));
        }
        self.fields.push(field);
        Ok(self)
    }

    /// Adds a scalar field.
    pub fn add_scalar(self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        self.push(FieldDef::scalar(name, data_type))
    }

    /// Adds a collection field.
    pub fn add_collection(self, name: impl Into<String>, data_type: DataType) -> Result<Self> {
        self.push(FieldDef::collection(name, data_type))
    }

    /// Builds the schema.
    pub fn build(self) -> Result<RecordSchema> {
        if self.fields.is_empty() {
            return Err(Error::invalid_schema(format!(
                "Record {} declares no fields",
                self.name
            )));
        }
        Ok(RecordSchema::new(self.name, self.fields))
    }
}
