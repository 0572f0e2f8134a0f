//! Wire formatting helpers.

use serde_json::Value;

use crate::util::json::normalize_arguments;

/// Tool result payload as the text sent back to the model. Strings are sent
/// as-is, everything else as compact JSON.
pub fn tool_result_to_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Call arguments as the JSON string the wire format expects.
pub fn arguments_to_string(arguments: &Value) -> String {
    match arguments {
        Value::Null => "{}".to_string(),
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

/// Decode a `function.arguments` field.
///
/// String arguments are unwrapped of repeated JSON string-encoding and kept
/// only when an object remains; anything else passes through as the raw
/// string. The fold path decodes arguments the same way.
pub fn decode_arguments(arguments: &Value, max_depth: usize) -> Value {
    normalize_arguments(arguments, max_depth)
}
