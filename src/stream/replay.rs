//! Replaying a UI part stream as canonical agent updates.
//!
//! Used when an agent is backed by a remote endpoint that already speaks the
//! UI stream protocol.

use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use serde_json::{Map, Value};

use crate::types::{
    AgentUpdate, Annotation, ContentItem, DataContent, Role, ToolInvocationPart, UIPart, UsageDetails,
    JSON_MEDIA_TYPE,
};
use crate::util::ids::IdGenerator;
use crate::util::json::{normalize_arguments, DEFAULT_UNWRAP_DEPTH};

/// Identity stamped on every replayed update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayContext {
    pub author_name: Option<String>,
    pub model_id: Option<String>,
}

impl ReplayContext {
    pub fn new(author_name: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            author_name: Some(author_name.into()),
            model_id: Some(model_id.into()),
        }
    }

    fn stamp(&self, mut update: AgentUpdate) -> AgentUpdate {
        update.author_name = self.author_name.clone();
        update.model_id = self.model_id.clone();
        update
    }
}

/// Updates for one part. Framing markers and parts with no canonical
/// counterpart produce nothing.
pub fn part_to_updates(
    part: &UIPart,
    ctx: &ReplayContext,
    ids: &dyn IdGenerator,
) -> Vec<AgentUpdate> {
    let updates = match part {
        UIPart::TextDelta { id, delta } => vec![AgentUpdate::text(id.clone(), delta.clone())],
        UIPart::ReasoningDelta { id, delta } => {
            vec![AgentUpdate::reasoning(id.clone(), delta.clone())]
        }
        UIPart::Source {
            source_id,
            url,
            title,
        } => vec![generated(
            ids,
            Role::Assistant,
            ContentItem::Text {
                text: source_id.clone(),
                annotations: vec![Annotation::Citation {
                    title: title.clone(),
                    url: Some(url.clone()),
                    snippet: None,
                }],
            },
        )],
        UIPart::Data { data_type, data } => vec![generated(
            ids,
            Role::Assistant,
            ContentItem::json_data(Some(data_type.clone()), data),
        )],
        UIPart::File { url, media_type } => vec![generated(
            ids,
            Role::Assistant,
            ContentItem::Data(DataContent {
                bytes: Vec::new(),
                media_type: media_type.clone(),
                name: None,
                uri: Some(url.clone()),
            }),
        )],
        UIPart::Finish {
            finish_reason,
            metadata,
        } => {
            let contents = match metadata {
                Some(Value::Object(map)) => {
                    vec![ContentItem::Usage(UsageDetails::from_metadata(map))]
                }
                _ => Vec::new(),
            };
            let mut update = AgentUpdate::new(contents).with_message_id(ids.next_id());
            update.finish_reason = finish_reason.clone().filter(|reason| !reason.is_empty());
            vec![update]
        }
        UIPart::ToolCall(call) if call.provider_executed => vec![forwarded(ids, part)],
        UIPart::ToolCall(call) => vec![generated(
            ids,
            Role::Assistant,
            ContentItem::function_call(
                call.tool_call_id.clone(),
                call.tool_name.clone(),
                normalize_arguments(&call.input, DEFAULT_UNWRAP_DEPTH),
            ),
        )],
        UIPart::ToolOutputAvailable {
            provider_executed: true,
            ..
        } => vec![forwarded(ids, part)],
        UIPart::ToolOutputAvailable {
            tool_call_id,
            output,
            ..
        } => vec![generated(
            ids,
            Role::Tool,
            ContentItem::function_result(tool_call_id.clone(), or_empty(Some(output))),
        )],
        UIPart::ToolInvocation(invocation) => invocation_updates(invocation, ids),
        UIPart::Text { .. }
        | UIPart::TextStart { .. }
        | UIPart::TextEnd { .. }
        | UIPart::ReasoningStart { .. }
        | UIPart::ReasoningEnd { .. }
        | UIPart::MessageMetadata { .. }
        | UIPart::Error { .. } => Vec::new(),
    };

    updates.into_iter().map(|update| ctx.stamp(update)).collect()
}

/// Call first, result second.
fn invocation_updates(invocation: &ToolInvocationPart, ids: &dyn IdGenerator) -> Vec<AgentUpdate> {
    vec![
        generated(
            ids,
            Role::Assistant,
            ContentItem::function_call(
                invocation.tool_call_id.clone(),
                invocation.tool_name(),
                normalize_arguments(&invocation.input, DEFAULT_UNWRAP_DEPTH),
            ),
        ),
        generated(
            ids,
            Role::Tool,
            ContentItem::function_result(
                invocation.tool_call_id.clone(),
                or_empty(invocation.output.as_ref()),
            ),
        ),
    ]
}

fn generated(ids: &dyn IdGenerator, role: Role, item: ContentItem) -> AgentUpdate {
    AgentUpdate::new(vec![item])
        .with_role(role)
        .with_message_id(ids.next_id())
}

/// A provider-executed tool part passed through as JSON data.
fn forwarded(ids: &dyn IdGenerator, part: &UIPart) -> AgentUpdate {
    AgentUpdate::new(vec![ContentItem::Data(DataContent {
        bytes: part.to_json().to_string().into_bytes(),
        media_type: JSON_MEDIA_TYPE.to_string(),
        name: None,
        uri: None,
    })])
    .with_message_id(ids.next_id())
}

fn or_empty(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Null) | None => Value::Object(Map::new()),
        Some(value) => value.clone(),
    }
}

/// Replay a part stream, preserving order.
pub fn replay_parts<S, G>(parts: S, ctx: ReplayContext, ids: G) -> BoxStream<'static, AgentUpdate>
where
    S: Stream<Item = UIPart> + Send + 'static,
    G: IdGenerator + 'static,
{
    Box::pin(parts.flat_map(move |part| futures::stream::iter(part_to_updates(&part, &ctx, &ids))))
}
