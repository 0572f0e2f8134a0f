//! Chat-completions wire format: request encoding and response decoding.

use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::config::WireConfig;
use crate::error::{AgentwireError, Result};
use crate::types::{ContentItem, DataContent, Message, Role, UsageDetails, JSON_MEDIA_TYPE};

use super::format::{arguments_to_string, decode_arguments, tool_result_to_string};

/// A function tool offered to the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "empty_schema")]
    pub parameters: Value,
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Per-request overrides on top of [`WireConfig`].
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default)]
pub struct RequestOptions {
    #[builder(into)]
    pub model: Option<String>,
    pub temperature: Option<f64>,
    #[builder(into)]
    pub tool_choice: Option<String>,
    pub parallel_tool_calls: Option<bool>,
    /// Passed through verbatim as `response_format`.
    pub response_format: Option<Value>,
}

/// A decoded, non-streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    pub id: Option<String>,
    pub created: Option<DateTime<Utc>>,
    /// Assistant message; carries a `Usage` item when usage was reported.
    pub message: Message,
    pub usage: Option<UsageDetails>,
    pub finish_reason: Option<String>,
}

/// Build a request body for `messages`.
pub fn encode_request(
    messages: &[Message],
    tools: &[ToolDefinition],
    config: &WireConfig,
    options: &RequestOptions,
) -> Value {
    let mut body = json!({
        "messages": encode_messages(messages),
        "stream": false,
        "temperature": options.temperature.unwrap_or(config.temperature),
        "tool_choice": options.tool_choice.as_deref().unwrap_or(&config.tool_choice),
        "parallel_tool_calls": options.parallel_tool_calls.unwrap_or(config.parallel_tool_calls),
    });

    if let Value::Object(obj) = &mut body {
        if let Some(model) = options.model.as_ref().or(config.model.as_ref()) {
            obj.insert("model".into(), model.clone().into());
        }
        if !tools.is_empty() {
            let tool_defs: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            obj.insert("tools".into(), tool_defs.into());
        }
        if let Some(format) = &options.response_format {
            obj.insert("response_format".into(), format.clone());
        }
    }

    body
}

/// Encode a message sequence, preserving order.
pub fn encode_messages(messages: &[Message]) -> Vec<Value> {
    messages.iter().flat_map(encode_message).collect()
}

/// Wire messages for one canonical message.
///
/// A tool message yields one wire message per function result. Content the
/// wire format cannot carry is left out.
pub fn encode_message(message: &Message) -> Vec<Value> {
    match message.role {
        Role::Tool => message
            .function_results()
            .into_iter()
            .map(|result| {
                json!({
                    "role": "tool",
                    "tool_call_id": result.call_id,
                    "content": [{
                        "type": "text",
                        "text": tool_result_to_string(&result.result),
                    }],
                })
            })
            .collect(),
        Role::Assistant => {
            let mut wire = json!({
                "role": "assistant",
                "content": encode_content(&message.content),
            });
            let tool_calls: Vec<Value> = message
                .function_calls()
                .into_iter()
                .map(|call| {
                    json!({
                        "id": call.call_id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": arguments_to_string(&call.arguments),
                        }
                    })
                })
                .collect();
            if !tool_calls.is_empty() {
                if let Value::Object(obj) = &mut wire {
                    obj.insert("tool_calls".into(), tool_calls.into());
                }
            }
            vec![wire]
        }
        Role::System | Role::User => vec![json!({
            "role": message.role.to_string(),
            "content": encode_content(&message.content),
        })],
    }
}

fn encode_content(content: &[ContentItem]) -> Vec<Value> {
    content
        .iter()
        .filter_map(|item| match item {
            ContentItem::Text { text, .. } => Some(json!({"type": "text", "text": text})),
            ContentItem::Data(data) if data.is_image() => Some(json!({
                "type": "image_url",
                "image_url": { "url": data.to_data_uri() }
            })),
            _ => None,
        })
        .collect()
}

// Chat-completions response types (internal)

#[derive(Deserialize)]
struct WireResponse {
    id: Option<String>,
    created: Option<i64>,
    choices: Option<Vec<WireChoice>>,
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Value,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
    total_tokens: Option<u64>,
}

/// Decode a response body given as text.
pub fn decode_response_str(body: &str, config: &WireConfig) -> Result<CompletionResponse> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AgentwireError::malformed(format!("response is not JSON: {e}")))?;
    decode_response(&value, config)
}

/// Decode a chat-completions response into an assistant message.
pub fn decode_response(body: &Value, config: &WireConfig) -> Result<CompletionResponse> {
    let response: WireResponse = serde_json::from_value(body.clone())
        .map_err(|e| AgentwireError::malformed(e.to_string()))?;
    let choice = response
        .choices
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| AgentwireError::malformed("response has no choices"))?;

    let mut message = Message::new(Role::Assistant, Vec::new());
    decode_content(
        choice.message.content,
        config.output_name.as_deref(),
        &mut message,
    );

    for call in choice.message.tool_calls.unwrap_or_default() {
        let arguments = decode_arguments(&call.function.arguments, config.max_unwrap_depth);
        if !arguments.is_object() {
            debug!(call_id = %call.id, "tool call arguments are not a JSON object");
        }
        message.push(ContentItem::function_call(
            call.id,
            call.function.name,
            arguments,
        ));
    }

    let usage = response.usage.map(|u| UsageDetails {
        input_tokens: u.prompt_tokens,
        output_tokens: u.completion_tokens,
        total_tokens: u.total_tokens,
    });
    if let Some(usage) = &usage {
        message.push(ContentItem::Usage(usage.clone()));
    }

    let created = response
        .created
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    trace!(id = ?response.id, items = message.content.len(), "decoded completion");

    Ok(CompletionResponse {
        id: response.id,
        created,
        message,
        usage,
        finish_reason: choice.finish_reason,
    })
}

/// Text content. A plain string reply under a structured output is also
/// attached as JSON data named `output_name`.
fn decode_content(content: Value, output_name: Option<&str>, message: &mut Message) {
    match content {
        Value::String(text) if !text.is_empty() => {
            message.push(ContentItem::text(text.as_str()));
            if let Some(name) = output_name {
                message.push(ContentItem::Data(DataContent {
                    bytes: text.into_bytes(),
                    media_type: JSON_MEDIA_TYPE.to_string(),
                    name: Some(name.to_string()),
                    uri: None,
                }));
            }
        }
        Value::Array(parts) => {
            for part in parts {
                if let Some(text) = part.get("text").and_then(Value::as_str) {
                    if !text.is_empty() {
                        message.push(ContentItem::text(text));
                    }
                }
            }
        }
        _ => {}
    }
}
