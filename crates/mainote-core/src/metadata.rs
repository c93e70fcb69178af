//! Metadata codec.
//!
//! Note metadata is an open JSON object. Absence is preserved through the
//! round trip: `None` encodes to `None` (a SQL `NULL`), while an empty map
//! encodes to `"{}"`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Free-form note metadata.
pub type Metadata = Map<String, Value>;

/// Serialize metadata for storage.
///
/// Generic over the map type so callers holding typed values can encode them
/// without first converting to [`Value`]. Any value whose serializer refuses
/// it is reported as [`Error::Encoding`].
pub fn encode<M: Serialize + ?Sized>(metadata: Option<&M>) -> Result<Option<String>> {
    let Some(metadata) = metadata else {
        return Ok(None);
    };
    let value = serde_json::to_value(metadata).map_err(|e| Error::Encoding(e.to_string()))?;
    if !value.is_object() {
        return Err(Error::Encoding(format!(
            "metadata must serialize to a JSON object, got {}",
            json_kind(&value)
        )));
    }
    serde_json::to_string(&value)
        .map(Some)
        .map_err(|e| Error::Encoding(e.to_string()))
}

/// Decode stored metadata.
///
/// Malformed input, or JSON that is not an object, means the stored row is
/// corrupt and is reported as [`Error::Decoding`].
pub fn decode(raw: Option<&str>) -> Result<Option<Metadata>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(other) => Err(Error::Decoding(format!(
            "metadata must be a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(Error::Decoding(format!("malformed metadata: {}", e))),
    }
}

/// Shallow-merge `patch` into `base`; keys in `patch` win.
pub fn merge(base: &mut Metadata, patch: Metadata) {
    for (key, value) in patch {
        base.insert(key, value);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
