//! JSON payload normalization.

use serde_json::{Map, Value};

/// How many layers of string-encoding are peeled by default.
pub const DEFAULT_UNWRAP_DEPTH: usize = 8;

/// Peel JSON string-encoding off `raw` until something other than a string
/// literal remains, then parse it.
///
/// `"\"{\\\"q\\\":1}\""` and `"{\"q\":1}"` both yield `{"q":1}`. Returns
/// `None` when the text is not JSON or more than `max_depth` layers are found.
pub fn unwrap_encoded_json(raw: &str, max_depth: usize) -> Option<Value> {
    let mut current = raw.trim().to_string();
    for _ in 0..=max_depth {
        if current.len() >= 2 && current.starts_with('"') && current.ends_with('"') {
            current = serde_json::from_str::<String>(&current).ok()?.trim().to_string();
            continue;
        }
        return serde_json::from_str::<Value>(&current).ok();
    }
    None
}

/// Normalize tool-call arguments into a JSON object where possible.
///
/// `null` becomes `{}`; a string is unwrapped and parsed, and kept as the raw
/// string when that does not produce an object. Other values pass through.
pub fn normalize_arguments(arguments: &Value, max_depth: usize) -> Value {
    match arguments {
        Value::Null => Value::Object(Map::new()),
        Value::String(raw) => match unwrap_encoded_json(raw, max_depth) {
            Some(object @ Value::Object(_)) => object,
            _ => arguments.clone(),
        },
        other => other.clone(),
    }
}
