//! Expanding UI turns back into canonical messages.

use serde_json::{Map, Value};

use crate::types::{ContentItem, Message, Role, UIMessage, UIPart, UIRole};
use crate::util::json::{normalize_arguments, DEFAULT_UNWRAP_DEPTH};

/// Expand one UI message.
///
/// User and system messages keep only their plain text parts. An assistant
/// turn becomes one assistant message followed by one tool message per tool
/// invocation part, in the order the calls appear.
pub fn expand_message(message: &UIMessage) -> Vec<Message> {
    let role = match message.role {
        UIRole::User => Role::User,
        UIRole::System => Role::System,
        UIRole::Assistant => return expand_assistant(message),
    };

    let content = message
        .parts
        .iter()
        .filter_map(|part| match part {
            UIPart::Text { text } => Some(ContentItem::text(text.clone())),
            _ => None,
        })
        .collect();
    vec![Message::new(role, content).with_id(message.id.clone())]
}

fn expand_assistant(message: &UIMessage) -> Vec<Message> {
    let mut assistant = Message::new(Role::Assistant, Vec::new()).with_id(message.id.clone());
    let mut tool_messages = Vec::new();

    for part in &message.parts {
        match part {
            UIPart::Text { text } => assistant.push(ContentItem::text(text.clone())),
            UIPart::TextDelta { delta, .. } => assistant.push(ContentItem::text(delta.clone())),
            UIPart::ToolCall(call) => assistant.push(ContentItem::function_call(
                call.tool_call_id.clone(),
                call.tool_name.clone(),
                arguments(&call.input),
            )),
            UIPart::ToolInvocation(invocation) => {
                assistant.push(ContentItem::function_call(
                    invocation.tool_call_id.clone(),
                    invocation.tool_name(),
                    arguments(&invocation.input),
                ));
                let output = invocation
                    .output
                    .clone()
                    .unwrap_or_else(|| Value::Object(Map::new()));
                tool_messages.push(Message::tool_result(
                    invocation.tool_call_id.clone(),
                    output,
                ));
            }
            _ => {}
        }
    }

    let mut expanded = Vec::with_capacity(1 + tool_messages.len());
    expanded.push(assistant);
    expanded.extend(tool_messages);
    expanded
}

/// Tool input as an argument mapping, kept raw when it is not an object.
fn arguments(input: &Value) -> Value {
    normalize_arguments(input, DEFAULT_UNWRAP_DEPTH)
}

/// Expand a UI transcript into canonical messages.
pub fn expand_messages<'a, I>(messages: I) -> Vec<Message>
where
    I: IntoIterator<Item = &'a UIMessage>,
{
    messages.into_iter().flat_map(expand_message).collect()
}
