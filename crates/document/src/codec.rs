//! Conversion between domain values and stored documents.
//!
//! Every domain type that derives `Serialize` and `Deserialize` is a
//! document: its serde fields become document fields, and the cache key is
//! stored alongside them as `_id`. Timestamps are expected to serialize as
//! integer epoch milliseconds.

use bson::{Bson, Document};
use flowdex_core::{Error, Result, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Name of the document field holding the cache key.
pub const ID_FIELD: &str = "_id";

/// Converts a value to and from its stored document.
pub trait DocumentCodec: Sized {
    /// Encodes the value, storing `key` as `_id`.
    fn encode(&self, key: &str) -> Result<Document>;

    /// Decodes a stored document, ignoring `_id`.
    fn decode(document: Document) -> Result<Self>;
}

impl<T> DocumentCodec for T
where
    T: Serialize + DeserializeOwned,
{
    fn encode(&self, key: &str) -> Result<Document> {
        let document =
            bson::to_document(self).map_err(|e| Error::codec("failed to encode document", e))?;
        if document.contains_key(ID_FIELD) {
            return Err(Error::Codec {
                message: format!("value already defines a `{}` field", ID_FIELD),
                source: None,
            });
        }
        // `_id` goes first, as a document store would place it.
        let mut stored = Document::new();
        stored.insert(ID_FIELD, key);
        for (name, value) in document {
            stored.insert(name, value);
        }
        Ok(stored)
    }

    fn decode(mut document: Document) -> Result<Self> {
        document.remove(ID_FIELD);
        bson::from_document(document).map_err(|e| Error::codec("failed to decode document", e))
    }
}

/// Returns the `_id` of a stored document.
pub fn document_key(document: &Document) -> Option<&str> {
    document.get_str(ID_FIELD).ok()
}

/// Converts a bound filter operand to its stored representation.
///
/// Timestamps become epoch-millisecond integers.
pub fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Boolean(b) => Bson::Boolean(*b),
        Value::Int32(i) => Bson::Int32(*i),
        Value::Int64(i) => Bson::Int64(*i),
        Value::Float64(f) => Bson::Double(*f),
        Value::String(s) => Bson::String(s.clone()),
        Value::DateTime(ms) => Bson::Int64(*ms),
        Value::List(items) => Bson::Array(items.iter().map(value_to_bson).collect()),
    }
}
