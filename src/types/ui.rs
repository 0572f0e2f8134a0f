//! UI message protocol types.
//!
//! Parts serialize to the AI SDK UI message stream shape: one JSON object per
//! part with a kebab-case `type` tag and camelCase fields. Tool invocation and
//! data parts carry dynamic tags (`tool-<name>`, `data-<name>`), so the serde
//! impls are written by hand.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::error::{AgentwireError, Result};

pub const TOOL_TYPE_PREFIX: &str = "tool-";
pub const DATA_TYPE_PREFIX: &str = "data-";
pub const UNKNOWN_TOOL_NAME: &str = "unknown";

/// Role of a UI message. Tool activity lives inside assistant turns.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UIRole {
    System,
    User,
    Assistant,
}

/// A UI message: one turn as a front-end renders it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIMessage {
    pub id: String,
    pub role: UIRole,
    #[serde(default)]
    pub parts: Vec<UIPart>,
}

impl UIMessage {
    pub fn new(id: impl Into<String>, role: UIRole, parts: Vec<UIPart>) -> Self {
        Self {
            id: id.into(),
            role,
            parts,
        }
    }

    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, UIRole::User, vec![UIPart::text(text)])
    }

    pub fn system(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(id, UIRole::System, vec![UIPart::text(text)])
    }

    /// Concatenated plain text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                UIPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Tool invocation parts, in order.
    pub fn tool_invocations(&self) -> Vec<&ToolInvocationPart> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                UIPart::ToolInvocation(invocation) => Some(invocation),
                _ => None,
            })
            .collect()
    }
}

/// A tool call announced on the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallPart {
    pub tool_call_id: String,
    pub tool_name: String,
    pub input: Value,
    pub provider_executed: bool,
}

/// Call and result merged into one part, as stored in persisted turns.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocationPart {
    pub tool_call_id: String,
    /// The `type` tag, `tool-<name>`.
    pub kind: String,
    pub input: Value,
    /// `None` until the result arrives.
    pub output: Option<Value>,
    pub provider_executed: bool,
}

impl ToolInvocationPart {
    /// A pending invocation of `tool_name`.
    pub fn pending(
        tool_call_id: impl Into<String>,
        tool_name: &str,
        input: Value,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            kind: format!("{TOOL_TYPE_PREFIX}{tool_name}"),
            input,
            output: None,
            provider_executed: false,
        }
    }

    /// The same invocation with its result attached.
    pub fn completed(&self, output: Value) -> Self {
        Self {
            output: Some(output),
            provider_executed: true,
            ..self.clone()
        }
    }

    pub fn is_completed(&self) -> bool {
        self.output.is_some()
    }

    /// Tool name taken from the `type` tag.
    ///
    /// An untagged kind is returned whole; an empty kind or a bare `tool-`
    /// prefix yields `"unknown"`.
    pub fn tool_name(&self) -> &str {
        match self.kind.strip_prefix(TOOL_TYPE_PREFIX) {
            Some("") => UNKNOWN_TOOL_NAME,
            Some(name) => name,
            None if self.kind.is_empty() => UNKNOWN_TOOL_NAME,
            None => self.kind.as_str(),
        }
    }
}

/// One typed fragment of a UI message or UI stream.
#[derive(Debug, Clone, PartialEq)]
pub enum UIPart {
    Text { text: String },
    TextStart { id: String },
    TextDelta { id: String, delta: String },
    TextEnd { id: String },
    ReasoningStart { id: String },
    ReasoningDelta { id: String, delta: String },
    ReasoningEnd { id: String },
    ToolCall(ToolCallPart),
    ToolOutputAvailable {
        tool_call_id: String,
        output: Value,
        provider_executed: bool,
    },
    ToolInvocation(ToolInvocationPart),
    Source {
        source_id: String,
        url: String,
        title: Option<String>,
    },
    File { url: String, media_type: String },
    /// Structured data; `data_type` is the full `data-<name>` tag.
    Data { data_type: String, data: Value },
    MessageMetadata { metadata: Value },
    Finish {
        finish_reason: Option<String>,
        metadata: Option<Value>,
    },
    Error { text: String },
}

impl UIPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn text_start(id: impl Into<String>) -> Self {
        Self::TextStart { id: id.into() }
    }

    pub fn text_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::TextDelta {
            id: id.into(),
            delta: delta.into(),
        }
    }

    pub fn text_end(id: impl Into<String>) -> Self {
        Self::TextEnd { id: id.into() }
    }

    pub fn reasoning_start(id: impl Into<String>) -> Self {
        Self::ReasoningStart { id: id.into() }
    }

    pub fn reasoning_delta(id: impl Into<String>, delta: impl Into<String>) -> Self {
        Self::ReasoningDelta {
            id: id.into(),
            delta: delta.into(),
        }
    }

    pub fn reasoning_end(id: impl Into<String>) -> Self {
        Self::ReasoningEnd { id: id.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error { text: text.into() }
    }

    pub fn source(source_id: impl Into<String>, url: impl Into<String>, title: Option<String>) -> Self {
        Self::Source {
            source_id: source_id.into(),
            url: url.into(),
            title,
        }
    }

    /// The protocol `type` tag of this part.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Text { .. } => "text",
            Self::TextStart { .. } => "text-start",
            Self::TextDelta { .. } => "text-delta",
            Self::TextEnd { .. } => "text-end",
            Self::ReasoningStart { .. } => "reasoning-start",
            Self::ReasoningDelta { .. } => "reasoning-delta",
            Self::ReasoningEnd { .. } => "reasoning-end",
            Self::ToolCall(_) => "tool-input-available",
            Self::ToolOutputAvailable { .. } => "tool-output-available",
            Self::ToolInvocation(invocation) => invocation.kind.as_str(),
            Self::Source { .. } => "source-url",
            Self::File { .. } => "file",
            Self::Data { data_type, .. } => data_type.as_str(),
            Self::MessageMetadata { .. } => "message-metadata",
            Self::Finish { .. } => "finish",
            Self::Error { .. } => "error",
        }
    }

    /// JSON object for this part.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("type".into(), Value::String(self.type_tag().to_string()));

        match self {
            Self::Text { text } => {
                obj.insert("text".into(), text.clone().into());
            }
            Self::TextStart { id }
            | Self::TextEnd { id }
            | Self::ReasoningStart { id }
            | Self::ReasoningEnd { id } => {
                obj.insert("id".into(), id.clone().into());
            }
            Self::TextDelta { id, delta } | Self::ReasoningDelta { id, delta } => {
                obj.insert("id".into(), id.clone().into());
                obj.insert("delta".into(), delta.clone().into());
            }
            Self::ToolCall(call) => {
                obj.insert("toolCallId".into(), call.tool_call_id.clone().into());
                obj.insert("toolName".into(), call.tool_name.clone().into());
                obj.insert("input".into(), call.input.clone());
                obj.insert("providerExecuted".into(), call.provider_executed.into());
            }
            Self::ToolOutputAvailable {
                tool_call_id,
                output,
                provider_executed,
            } => {
                obj.insert("toolCallId".into(), tool_call_id.clone().into());
                obj.insert("output".into(), output.clone());
                obj.insert("providerExecuted".into(), (*provider_executed).into());
            }
            Self::ToolInvocation(invocation) => {
                let state = if invocation.is_completed() {
                    "output-available"
                } else {
                    "input-available"
                };
                obj.insert("toolCallId".into(), invocation.tool_call_id.clone().into());
                obj.insert("state".into(), state.into());
                obj.insert("input".into(), invocation.input.clone());
                if let Some(output) = &invocation.output {
                    obj.insert("output".into(), output.clone());
                }
                obj.insert(
                    "providerExecuted".into(),
                    invocation.provider_executed.into(),
                );
            }
            Self::Source {
                source_id,
                url,
                title,
            } => {
                obj.insert("sourceId".into(), source_id.clone().into());
                obj.insert("url".into(), url.clone().into());
                if let Some(title) = title {
                    obj.insert("title".into(), title.clone().into());
                }
            }
            Self::File { url, media_type } => {
                obj.insert("url".into(), url.clone().into());
                obj.insert("mediaType".into(), media_type.clone().into());
            }
            Self::Data { data, .. } => {
                obj.insert("data".into(), data.clone());
            }
            Self::MessageMetadata { metadata } => {
                obj.insert("messageMetadata".into(), metadata.clone());
            }
            Self::Finish {
                finish_reason,
                metadata,
            } => {
                if let Some(reason) = finish_reason {
                    obj.insert("finishReason".into(), reason.clone().into());
                }
                if let Some(metadata) = metadata {
                    obj.insert("messageMetadata".into(), metadata.clone());
                }
            }
            Self::Error { text } => {
                obj.insert("errorText".into(), text.clone().into());
            }
        }

        Value::Object(obj)
    }

    /// Parse a part from its JSON object.
    ///
    /// A `tool-*` part carrying `state` is a persisted invocation, even when
    /// the tool's name collides with a stream tag such as `output-available`.
    pub fn from_json(value: Value) -> Result<Self> {
        let Value::Object(mut obj) = value else {
            return Err(invalid("UI part must be a JSON object"));
        };
        let kind = match obj.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(invalid("UI part is missing a string `type`")),
        };

        if kind.starts_with(TOOL_TYPE_PREFIX) && is_persisted_invocation(&obj) {
            return take_invocation(kind, &mut obj);
        }

        let part = match kind.as_str() {
            "text" => Self::Text {
                text: take_str(&mut obj, "text")?,
            },
            "text-start" => Self::TextStart {
                id: take_str(&mut obj, "id")?,
            },
            "text-delta" => Self::TextDelta {
                id: take_str(&mut obj, "id")?,
                delta: take_str(&mut obj, "delta")?,
            },
            "text-end" => Self::TextEnd {
                id: take_str(&mut obj, "id")?,
            },
            "reasoning-start" => Self::ReasoningStart {
                id: take_str(&mut obj, "id")?,
            },
            "reasoning-delta" => Self::ReasoningDelta {
                id: take_str(&mut obj, "id")?,
                delta: take_str(&mut obj, "delta")?,
            },
            "reasoning-end" => Self::ReasoningEnd {
                id: take_str(&mut obj, "id")?,
            },
            "tool-input-available" => Self::ToolCall(ToolCallPart {
                tool_call_id: take_str(&mut obj, "toolCallId")?,
                tool_name: take_str(&mut obj, "toolName")?,
                input: take_value(&mut obj, "input"),
                provider_executed: take_bool(&mut obj, "providerExecuted"),
            }),
            "tool-output-available" => Self::ToolOutputAvailable {
                tool_call_id: take_str(&mut obj, "toolCallId")?,
                output: take_value(&mut obj, "output"),
                provider_executed: take_bool(&mut obj, "providerExecuted"),
            },
            "source-url" => Self::Source {
                source_id: take_str(&mut obj, "sourceId")?,
                url: take_str(&mut obj, "url")?,
                title: take_opt_str(&mut obj, "title"),
            },
            "file" => Self::File {
                url: take_str(&mut obj, "url")?,
                media_type: take_str(&mut obj, "mediaType")?,
            },
            "message-metadata" => Self::MessageMetadata {
                metadata: take_value(&mut obj, "messageMetadata"),
            },
            "finish" => Self::Finish {
                finish_reason: take_opt_str(&mut obj, "finishReason"),
                metadata: obj.remove("messageMetadata").filter(|v| !v.is_null()),
            },
            "error" => Self::Error {
                text: take_str(&mut obj, "errorText")?,
            },
            other if other.starts_with(DATA_TYPE_PREFIX) => Self::Data {
                data_type: other.to_string(),
                data: obj.remove("data").unwrap_or(Value::Null),
            },
            other if other.starts_with(TOOL_TYPE_PREFIX) => {
                return take_invocation(other.to_string(), &mut obj);
            }
            other => return Err(invalid(format!("unknown UI part type `{other}`"))),
        };

        Ok(part)
    }
}

impl Serialize for UIPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UIPart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(value).map_err(serde::de::Error::custom)
    }
}

fn invalid(message: impl Into<String>) -> AgentwireError {
    AgentwireError::InvalidArgument(message.into())
}

/// Stream tool parts never carry `state`; `tool-input-available` also names its tool.
fn is_persisted_invocation(obj: &Map<String, Value>) -> bool {
    obj.contains_key("state") && !obj.contains_key("toolName")
}

fn take_invocation(kind: String, obj: &mut Map<String, Value>) -> Result<UIPart> {
    Ok(UIPart::ToolInvocation(ToolInvocationPart {
        tool_call_id: take_str(obj, "toolCallId")?,
        kind,
        input: take_value(obj, "input"),
        output: obj.remove("output").filter(|v| !v.is_null()),
        provider_executed: take_bool(obj, "providerExecuted"),
    }))
}

fn take_str(obj: &mut Map<String, Value>, key: &str) -> Result<String> {
    match obj.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(invalid(format!("field `{key}` must be a string"))),
        None => Err(invalid(format!("missing field `{key}`"))),
    }
}

fn take_opt_str(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    match obj.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn take_bool(obj: &mut Map<String, Value>, key: &str) -> bool {
    matches!(obj.remove(key), Some(Value::Bool(true)))
}

/// Missing or null payloads read as an empty object.
fn take_value(obj: &mut Map<String, Value>, key: &str) -> Value {
    match obj.remove(key) {
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(value) => value,
    }
}
