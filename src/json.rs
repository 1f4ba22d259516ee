use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// A parsed JSON object.
pub type JsonObject = Map<String, Value>;

/// Parses `s` as JSON and requires the top-level value to be an object.
///
/// Arrays, strings, numbers, booleans and `null` are rejected even though they are valid
/// JSON, so header fields can always be looked up by name.
///
/// # Errors
/// Returns [`Error::InvalidHeader`] if `s` is not JSON or not an object.
pub fn try_parse_object(s: &str) -> Result<JsonObject> {
    match try_parse_any(s) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(Error::InvalidHeader(format!(
            "expected a JSON object, found {}: {s}",
            kind(&other)
        ))),
        Err(e) => Err(Error::InvalidHeader(format!("{e}: {s}"))),
    }
}

/// Parses `s` as any JSON value.
pub fn try_parse_any(s: &str) -> serde_json::Result<Value> {
    serde_json::from_str(s)
}

/// Returns `true` if `s` parses as a JSON object.
pub fn is_safe_json_object(s: &str) -> bool {
    try_parse_object(s).is_ok()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
