//! Streaming aggregation of agent updates into a framed UI part stream.
//!
//! [`StreamAggregator`] is the synchronous state machine; the async adapters
//! [`aggregate_agent_updates`] and [`aggregate_workflow_events`] drive it over
//! one input stream each and own a fresh aggregator per call.

use std::fmt::Display;

use chrono::Utc;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::config::StreamConfig;
use crate::convert::content::data_to_part;
use crate::state::{CorrelationTable, StreamIdSet};
use crate::types::{
    AgentUpdate, Annotation, CallToolResult, ContentItem, FunctionCall, FunctionResult,
    ToolCallPart, UIPart, WorkflowEvent,
};
use crate::util::json::{normalize_arguments, DEFAULT_UNWRAP_DEPTH};

/// Per-turn aggregation state.
#[derive(Debug)]
pub struct StreamAggregator {
    text: StreamIdSet,
    reasoning: StreamIdSet,
    calls: CorrelationTable<ToolCallPart>,
    author: Option<String>,
    finish_reason: String,
    unwrap_depth: usize,
}

impl Default for StreamAggregator {
    fn default() -> Self {
        Self::new(&StreamConfig::default())
    }
}

impl StreamAggregator {
    /// Create an aggregator with no open streams and an empty call table.
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            text: StreamIdSet::new(),
            reasoning: StreamIdSet::new(),
            calls: CorrelationTable::new(),
            author: None,
            finish_reason: config.finish_reason.clone(),
            unwrap_depth: DEFAULT_UNWRAP_DEPTH,
        }
    }

    /// Set how many layers of string-encoded JSON arguments are unwrapped.
    pub fn with_unwrap_depth(mut self, depth: usize) -> Self {
        self.unwrap_depth = depth;
        self
    }

    /// Most recently observed non-blank author name.
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Number of text stream ids currently open.
    pub fn open_text_streams(&self) -> usize {
        self.text.len()
    }

    /// Number of reasoning stream ids currently open.
    pub fn open_reasoning_streams(&self) -> usize {
        self.reasoning.len()
    }

    /// Map every content item of `update`, in order.
    pub fn push_update(&mut self, update: &AgentUpdate, include_files: bool) -> Vec<UIPart> {
        if let Some(author) = update.author_name.as_deref() {
            if !author.trim().is_empty() {
                self.author = Some(author.to_string());
            }
        }

        let message_id = update.message_id.as_deref().unwrap_or_default();
        update
            .contents
            .iter()
            .flat_map(|item| self.map_content(item, message_id, include_files))
            .collect()
    }

    /// Map one workflow event.
    pub fn push_workflow_event(&mut self, event: &WorkflowEvent) -> Vec<UIPart> {
        match event {
            WorkflowEvent::AgentUpdate(update) => self.push_update(update, false),
            WorkflowEvent::Output { .. } => self.close_text(),
            WorkflowEvent::Error { .. } | WorkflowEvent::ExecutorFailed { .. } => event
                .failure_message()
                .map(|message| vec![UIPart::error(message)])
                .unwrap_or_default(),
            WorkflowEvent::Other => Vec::new(),
        }
    }

    /// Parts for one content item. `message_id` may be empty.
    pub fn map_content(
        &mut self,
        item: &ContentItem,
        message_id: &str,
        include_files: bool,
    ) -> Vec<UIPart> {
        match item {
            ContentItem::Usage(usage) => vec![UIPart::MessageMetadata {
                metadata: usage.to_metadata(),
            }],
            ContentItem::Uri { uri, .. } => {
                vec![UIPart::source(uri.clone(), uri.clone(), Some(uri.clone()))]
            }
            ContentItem::Error { message } => vec![UIPart::error(message.clone())],
            ContentItem::Text { text, annotations } => {
                let mut parts = Vec::new();
                if !text.is_empty() && annotations.is_empty() && !message_id.is_empty() {
                    if self.text.open(message_id) {
                        parts.push(UIPart::text_start(message_id));
                    }
                    parts.push(UIPart::text_delta(message_id, text.clone()));
                }
                parts.extend(citation_sources(text, annotations));
                parts
            }
            ContentItem::Reasoning { text } => {
                let mut parts = Vec::new();
                if !text.is_empty() && !message_id.is_empty() {
                    if self.reasoning.open(message_id) {
                        parts.push(UIPart::reasoning_start(message_id));
                    }
                    parts.push(UIPart::reasoning_delta(message_id, text.clone()));
                }
                parts
            }
            ContentItem::Data(data) if include_files => {
                data_to_part(data).into_part().into_iter().collect()
            }
            ContentItem::Data(_) => Vec::new(),
            ContentItem::FunctionCall(call) => self.map_call(call),
            ContentItem::FunctionResult(result) => self.map_result(result),
            ContentItem::Unsupported => Vec::new(),
        }
    }

    fn map_call(&mut self, call: &FunctionCall) -> Vec<UIPart> {
        if call.call_id.is_empty() {
            debug!(name = %call.name, "dropping function call without a call id");
            return Vec::new();
        }

        let part = ToolCallPart {
            tool_call_id: call.call_id.clone(),
            tool_name: call.name.clone(),
            input: normalize_arguments(&call.arguments, self.unwrap_depth),
            provider_executed: true,
        };
        if self.calls.upsert(call.call_id.clone(), part.clone()).is_some() {
            trace!(call_id = %call.call_id, "replacing pending tool call");
        }
        vec![UIPart::ToolCall(part)]
    }

    fn map_result(&mut self, result: &FunctionResult) -> Vec<UIPart> {
        if result.call_id.is_empty() || !self.calls.contains(&result.call_id) {
            debug!(call_id = %result.call_id, "dropping function result without a matching call");
            return Vec::new();
        }

        let output = match &result.result {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        let references = CallToolResult::from_value(&output)
            .map(|parsed| parsed.references())
            .unwrap_or_default();

        let mut parts = vec![UIPart::ToolOutputAvailable {
            tool_call_id: result.call_id.clone(),
            output,
            provider_executed: true,
        }];
        parts.extend(
            references
                .into_iter()
                .map(|reference| UIPart::source(reference.uri.clone(), reference.uri, reference.title)),
        );
        parts
    }

    /// `TextEnd` for every open text stream, in open order.
    pub fn close_text(&mut self) -> Vec<UIPart> {
        self.text.close_all().into_iter().map(UIPart::text_end).collect()
    }

    /// `ReasoningEnd` for every open reasoning stream, in open order.
    pub fn close_reasoning(&mut self) -> Vec<UIPart> {
        self.reasoning
            .close_all()
            .into_iter()
            .map(UIPart::reasoning_end)
            .collect()
    }

    /// Closing parts of a single-agent turn.
    pub fn finish_agent(&mut self) -> Vec<UIPart> {
        let mut parts = self.close_text();
        parts.extend(self.close_reasoning());
        let author = self.author.clone().unwrap_or_default();
        parts.push(self.finish_part(json!({
            "timestamp": Utc::now().to_rfc3339(),
            "author": author,
        })));
        parts
    }

    /// Closing parts of a workflow turn. Reasoning streams stay open.
    pub fn finish_workflow(&mut self) -> Vec<UIPart> {
        let mut parts = self.close_text();
        parts.push(self.finish_part(json!({
            "timestamp": Utc::now().to_rfc3339(),
        })));
        parts
    }

    fn finish_part(&self, metadata: Value) -> UIPart {
        UIPart::Finish {
            finish_reason: Some(self.finish_reason.clone()),
            metadata: Some(metadata),
        }
    }
}

fn citation_sources(text: &str, annotations: &[Annotation]) -> Vec<UIPart> {
    annotations
        .iter()
        .filter_map(|annotation| match annotation {
            Annotation::Citation { url, title, .. } => url
                .as_deref()
                .filter(|url| !url.is_empty())
                .map(|url| UIPart::source(text, url, title.clone())),
        })
        .collect()
}

/// Aggregate a single-agent update stream into one UI turn.
///
/// Upstream errors become `error` parts and aggregation continues. At the end
/// of input open streams are closed and a `finish` part is emitted. When
/// `cancel` fires the stream ends immediately with no closing parts.
pub fn aggregate_agent_updates<S, E>(
    updates: S,
    config: StreamConfig,
    cancel: CancellationToken,
) -> BoxStream<'static, UIPart>
where
    S: Stream<Item = Result<AgentUpdate, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut aggregator = StreamAggregator::new(&config);
        let mut inner = std::pin::pin!(updates);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("agent update aggregation cancelled");
                    return;
                }
                next = inner.next() => next,
            };
            let Some(item) = next else { break };

            let parts = match item {
                Ok(update) => aggregator.push_update(&update, true),
                Err(e) => vec![UIPart::error(e.to_string())],
            };
            for part in parts {
                yield part;
            }
        }

        for part in aggregator.finish_agent() {
            yield part;
        }
    };
    Box::pin(stream)
}

/// Aggregate a workflow event stream into one UI turn.
///
/// File parts are suppressed for workflow-sourced content. `output` events
/// close text streams; error events become `error` parts.
pub fn aggregate_workflow_events<S>(
    events: S,
    config: StreamConfig,
    cancel: CancellationToken,
) -> BoxStream<'static, UIPart>
where
    S: Stream<Item = WorkflowEvent> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut aggregator = StreamAggregator::new(&config);
        let mut inner = std::pin::pin!(events);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("workflow event aggregation cancelled");
                    return;
                }
                next = inner.next() => next,
            };
            let Some(event) = next else { break };

            for part in aggregator.push_workflow_event(&event) {
                yield part;
            }
        }

        for part in aggregator.finish_workflow() {
            yield part;
        }
    };
    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_message_id_is_dropped() {
        let mut aggregator = StreamAggregator::default();
        assert!(aggregator
            .map_content(&ContentItem::text("hi"), "", true)
            .is_empty());
        assert_eq!(aggregator.open_text_streams(), 0);
    }

    #[test]
    fn citation_emits_source_keyed_by_text() {
        let mut aggregator = StreamAggregator::default();
        let item = ContentItem::cited("Rust book", "https://doc.rust-lang.org", Some("Docs".into()));
        assert_eq!(
            aggregator.map_content(&item, "m1", true),
            vec![UIPart::source(
                "Rust book",
                "https://doc.rust-lang.org",
                Some("Docs".into())
            )]
        );
        assert_eq!(aggregator.open_text_streams(), 0);
    }

    #[test]
    fn data_is_suppressed_without_files() {
        let mut aggregator = StreamAggregator::default();
        let item = ContentItem::json_data(Some("chart".into()), &json!({"x": 1}));
        assert!(aggregator.map_content(&item, "m1", false).is_empty());
        assert_eq!(aggregator.map_content(&item, "m1", true).len(), 1);
    }

    #[test]
    fn blank_author_does_not_replace_previous() {
        let mut aggregator = StreamAggregator::default();
        aggregator.push_update(&AgentUpdate::default().with_author("planner"), true);
        aggregator.push_update(&AgentUpdate::default().with_author("  "), true);
        assert_eq!(aggregator.author(), Some("planner"));
    }
}
