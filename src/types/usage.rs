//! Token usage types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token counts reported by a model. Any count may be missing.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UsageDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl UsageDetails {
    pub fn new(input_tokens: u64, output_tokens: u64, total_tokens: u64) -> Self {
        Self {
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
            total_tokens: Some(total_tokens),
        }
    }

    /// Metadata object for the UI stream. Missing counts become `0`.
    pub fn to_metadata(&self) -> Value {
        serde_json::json!({
            "totalTokens": self.total_tokens.unwrap_or(0),
            "inputTokens": self.input_tokens.unwrap_or(0),
            "outputTokens": self.output_tokens.unwrap_or(0),
        })
    }

    /// Read counts back out of a UI metadata object.
    ///
    /// Counts may be JSON numbers or numeric strings; anything else is treated
    /// as absent.
    pub fn from_metadata(metadata: &Map<String, Value>) -> Self {
        Self {
            input_tokens: metadata.get("inputTokens").and_then(count),
            output_tokens: metadata.get("outputTokens").and_then(count),
            total_tokens: metadata.get("totalTokens").and_then(count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.input_tokens.is_none() && self.output_tokens.is_none() && self.total_tokens.is_none()
    }
}

fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
