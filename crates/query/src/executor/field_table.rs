//! Field tables: per-type field definitions with typed accessors.

use flowdex_core::schema::{FieldDef, RecordSchema};
use flowdex_core::{DataType, Value};

/// Reads one field of a record as a `Value`.
pub type Accessor<V> = fn(&V) -> Value;

/// A record schema paired with one accessor per field.
///
/// Accessors are indexed by field position, so a bound field resolves to
/// its accessor without any lookup at evaluation time.
pub struct FieldTable<V> {
    schema: RecordSchema,
    accessors: Vec<Accessor<V>>,
}

impl<V> FieldTable<V> {
    /// Starts a table for the named record type.
    pub fn builder(name: impl Into<String>) -> FieldTableBuilder<V> {
        FieldTableBuilder {
            name: name.into(),
            fields: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Returns the record schema.
    #[inline]
    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    /// Extracts a bound field from a record.
    #[inline]
    pub fn extract(&self, field: &FieldDef, record: &V) -> Value {
        (self.accessors[field.index()])(record)
    }

    /// Extracts a field by name, `None` if the schema does not declare it.
    pub fn extract_by_name(&self, name: &str, record: &V) -> Option<Value> {
        self.schema
            .get_field_index(name)
            .map(|i| (self.accessors[i])(record))
    }
}

impl<V> std::fmt::Debug for FieldTable<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldTable")
            .field("schema", &self.schema)
            .finish()
    }
}

/// Builder for [`FieldTable`].
///
/// Field tables are declared statically next to their record type, so
/// declaration mistakes are programming errors and checked in debug builds.
pub struct FieldTableBuilder<V> {
    name: String,
    fields: Vec<FieldDef>,
    accessors: Vec<Accessor<V>>,
}

impl<V> FieldTableBuilder<V> {
    fn push(mut self, field: FieldDef, accessor: Accessor<V>) -> Self {
        debug_assert!(
            self.fields.iter().all(|f| f.name() != field.name()),
            "duplicate field `{}` in `{}`",
            field.name(),
            self.name
        );
        self.fields.push(field);
        self.accessors.push(accessor);
        self
    }

    /// Declares a single-valued field.
    pub fn scalar(self, name: &str, data_type: DataType, accessor: Accessor<V>) -> Self {
        self.push(FieldDef::scalar(name, data_type), accessor)
    }

    /// Declares a collection field; the accessor returns `Value::List`.
    pub fn collection(self, name: &str, data_type: DataType, accessor: Accessor<V>) -> Self {
        self.push(FieldDef::collection(name, data_type), accessor)
    }

    pub fn build(self) -> FieldTable<V> {
        FieldTable {
            schema: RecordSchema::new(self.name, self.fields),
            accessors: self.accessors,
        }
    }
}

/// A domain value type that can be queried.
///
/// Implementors expose a field table built once for the process lifetime,
/// typically through a `std::sync::OnceLock`.
pub trait Record: Clone + Send + Sync + 'static {
    /// Returns the field table of this record type.
    fn field_table() -> &'static FieldTable<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Item {
        id: String,
        tags: Vec<String>,
    }

    fn table() -> FieldTable<Item> {
        FieldTable::<Item>::builder("items")
            .scalar("id", DataType::String, |i| Value::from(&i.id))
            .collection("tags", DataType::String, |i| Value::string_list(i.tags.iter().cloned()))
            .build()
    }

    #[test]
    fn test_field_table_extract() {
        let table = table();
        let item = Item {
            id: "a".into(),
            tags: vec!["x".into()],
        };
        let tags = table.schema().resolve("tags").unwrap().clone();
        assert_eq!(table.extract(&tags, &item), Value::string_list(["x"]));
        assert_eq!(table.extract_by_name("id", &item), Some(Value::from("a")));
        assert_eq!(table.extract_by_name("nope", &item), None);
    }

    #[test]
    fn test_field_table_schema_order() {
        let table = table();
        let names: Vec<_> = table.schema().fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["id", "tags"]);
    }
}
