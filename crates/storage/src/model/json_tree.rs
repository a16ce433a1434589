//! Stored form of free-form JSON attributes (`variables`, `inputs`, `outputs`).
//!
//! Used as `#[serde(default, skip_serializing_if = "Option::is_none", with = "json_tree")]`:
//! an absent tree is left out of the document and an explicit JSON `null`
//! is stored as a null field, so both read back unchanged.
//!
//! Documents hold signed 64-bit integers at most. Unsigned numbers above
//! `i64::MAX` are stored as `{"@u64": "<digits>"}`, and a user object whose
//! only key is `@u64` is wrapped once more so that decoding is exact.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};

const U64_TAG: &str = "@u64";

pub(crate) fn serialize<S>(value: &Option<JsonValue>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(tree) => encode(tree).serialize(serializer),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<JsonValue>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(|tree| Some(decode(tree)))
}

fn tag(value: JsonValue) -> JsonValue {
    let mut map = Map::new();
    map.insert(U64_TAG.to_string(), value);
    JsonValue::Object(map)
}

/// Returns the tagged payload of a single-key `@u64` object.
fn tagged(map: &Map<String, JsonValue>) -> Option<&JsonValue> {
    if map.len() == 1 {
        map.get(U64_TAG)
    } else {
        None
    }
}

fn encode(value: &JsonValue) -> JsonValue {
    match value {
        JsonValue::Number(n) => match n.as_u64() {
            Some(u) if i64::try_from(u).is_err() => tag(JsonValue::String(u.to_string())),
            _ => value.clone(),
        },
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(encode).collect()),
        JsonValue::Object(map) => {
            if let Some(inner) = tagged(map) {
                return tag(tag(encode(inner)));
            }
            JsonValue::Object(map.iter().map(|(k, v)| (k.clone(), encode(v))).collect())
        }
        _ => value.clone(),
    }
}

fn decode(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Array(items) => JsonValue::Array(items.into_iter().map(decode).collect()),
        JsonValue::Object(mut map) => {
            if tagged(&map).is_some() {
                match map.remove(U64_TAG) {
                    Some(JsonValue::String(digits)) => match digits.parse::<u64>() {
                        Ok(u) => return JsonValue::Number(Number::from(u)),
                        Err(_) => {
                            map.insert(U64_TAG.to_string(), JsonValue::String(digits));
                        }
                    },
                    Some(JsonValue::Object(mut inner)) if tagged(&inner).is_some() => {
                        if let Some(payload) = inner.remove(U64_TAG) {
                            return tag(decode(payload));
                        }
                    }
                    Some(other) => {
                        map.insert(U64_TAG.to_string(), other);
                    }
                    None => {}
                }
            }
            JsonValue::Object(map.into_iter().map(|(k, v)| (k, decode(v))).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_large_unsigned_is_tagged() {
        let tree = json!({ "n": u64::MAX, "small": 7, "neg": -3 });
        let stored = encode(&tree);
        assert_eq!(stored["n"], json!({ "@u64": "18446744073709551615" }));
        assert_eq!(stored["small"], json!(7));
        assert_eq!(decode(stored), tree);
    }

    #[test]
    fn test_user_tag_objects_survive() {
        for tree in [
            json!({ "@u64": "5" }),
            json!({ "@u64": { "@u64": 1 } }),
            json!([{ "@u64": u64::MAX }]),
            json!({ "@u64": "5", "other": true }),
        ] {
            assert_eq!(decode(encode(&tree)), tree);
        }
    }
}
