//! Canonical message types shared by every conversion.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::usage::UsageDetails;

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// A message in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentItem>,
}

impl Message {
    pub fn new(role: Role, content: Vec<ContentItem>) -> Self {
        Self {
            role,
            id: None,
            content,
        }
    }

    /// Create a system message.
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, vec![ContentItem::text(text)])
    }

    /// Create a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentItem::text(text)])
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentItem::text(text)])
    }

    /// Create a tool result message.
    pub fn tool_result(call_id: impl Into<String>, result: serde_json::Value) -> Self {
        Self::new(
            Role::Tool,
            vec![ContentItem::FunctionResult(FunctionResult {
                call_id: call_id.into(),
                result,
            })],
        )
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Append a content item.
    pub fn push(&mut self, item: ContentItem) {
        self.content.push(item);
    }

    /// Extract the text content, concatenating all text items.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|item| match item {
                ContentItem::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Function calls carried by this message, in order.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.content
            .iter()
            .filter_map(|item| match item {
                ContentItem::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }

    /// Function results carried by this message, in order.
    pub fn function_results(&self) -> Vec<&FunctionResult> {
        self.content
            .iter()
            .filter_map(|item| match item {
                ContentItem::FunctionResult(result) => Some(result),
                _ => None,
            })
            .collect()
    }
}

/// Conversation role.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A single item of message content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        annotations: Vec<Annotation>,
    },
    Data(DataContent),
    /// A bare reference to an external resource.
    Uri {
        uri: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media_type: Option<String>,
    },
    FunctionCall(FunctionCall),
    FunctionResult(FunctionResult),
    Usage(UsageDetails),
    Reasoning {
        text: String,
    },
    Error {
        message: String,
    },
    /// Content kinds this crate does not know. Every mapper drops them.
    #[serde(other)]
    Unsupported,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            annotations: Vec::new(),
        }
    }

    pub fn reasoning(text: impl Into<String>) -> Self {
        Self::Reasoning { text: text.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri {
            uri: uri.into(),
            media_type: None,
        }
    }

    /// Text carrying a single citation.
    pub fn cited(text: impl Into<String>, url: impl Into<String>, title: Option<String>) -> Self {
        Self::Text {
            text: text.into(),
            annotations: vec![Annotation::Citation {
                title,
                url: Some(url.into()),
                snippet: None,
            }],
        }
    }

    pub fn function_call(
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self::FunctionCall(FunctionCall {
            call_id: call_id.into(),
            name: name.into(),
            arguments,
        })
    }

    pub fn function_result(call_id: impl Into<String>, result: serde_json::Value) -> Self {
        Self::FunctionResult(FunctionResult {
            call_id: call_id.into(),
            result,
        })
    }

    /// JSON payload encoded as a `Data` item.
    pub fn json_data(name: Option<String>, value: &serde_json::Value) -> Self {
        Self::Data(DataContent {
            bytes: value.to_string().into_bytes(),
            media_type: JSON_MEDIA_TYPE.to_string(),
            name,
            uri: None,
        })
    }
}

/// Annotations attached to text content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Annotation {
    Citation {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        snippet: Option<String>,
    },
}

/// Binary or structured payload with a media type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataContent {
    #[serde(default, with = "base64_bytes")]
    pub bytes: Vec<u8>,
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

impl DataContent {
    pub fn is_image(&self) -> bool {
        self.media_type.starts_with("image/")
    }

    pub fn is_json(&self) -> bool {
        self.media_type.eq_ignore_ascii_case(JSON_MEDIA_TYPE)
    }

    /// `data:` URI for the payload, or the external URI when one is set.
    pub fn to_data_uri(&self) -> String {
        use base64::Engine as _;

        match &self.uri {
            Some(uri) => uri.clone(),
            None => format!(
                "data:{};base64,{}",
                self.media_type,
                base64::engine::general_purpose::STANDARD.encode(&self.bytes)
            ),
        }
    }
}

/// A function (tool) call requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    /// Empty when the producer did not assign one.
    #[serde(default)]
    pub call_id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// The result of a function call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionResult {
    #[serde(default)]
    pub call_id: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

mod base64_bytes {
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
